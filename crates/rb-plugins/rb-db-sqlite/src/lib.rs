//! # rb-db-sqlite Implementation
//!
//! SQLite used as a document store. Each row of `threads` holds one complete
//! Thread document (replies embedded) as JSON; `board` and `bumped_on` are
//! copied out of the document so the board listing can filter and sort in SQL.
//!
//! Updates after creation are targeted `json_set`/`json_insert` edits inside a
//! single statement, so a writer never overwrites fields it did not change.

use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::SecondsFormat;
use rb_core::models::{Reply, ReplyUpdate, Thread, DELETED_TEXT};
use rb_core::traits::ThreadRepo;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use uuid::Uuid;

const CREATE_THREADS: &str = "CREATE TABLE IF NOT EXISTS threads (
    id        TEXT PRIMARY KEY NOT NULL,
    board     TEXT NOT NULL,
    bumped_on INTEGER NOT NULL,
    document  TEXT NOT NULL
)";

const CREATE_BOARD_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS threads_board_bumped ON threads (board, bumped_on DESC)";

pub struct SqliteThreadRepo {
    pool: SqlitePool,
}

impl SqliteThreadRepo {
    /// Opens the pool and creates the schema if missing.
    ///
    /// # Developer Note
    /// An in-memory database lives only as long as its connection, so
    /// `sqlite::memory:` gets one connection that is never recycled.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url `{url}`"))?
            .create_if_missing(true);

        let in_memory = url.contains(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 8 })
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open SQLite pool")?;

        sqlx::query(CREATE_THREADS).execute(&pool).await?;
        sqlx::query(CREATE_BOARD_INDEX).execute(&pool).await?;

        log::info!("thread store ready ({})", if in_memory { "in-memory" } else { url });
        Ok(Self { pool })
    }
}

// `bumped_on` is stored as microseconds so ordering is numeric, not textual.
fn bump_key(thread: &Thread) -> i64 {
    thread.bumped_on.timestamp_micros()
}

// `(path, JSON value)` of the single field a reply update writes.
fn reply_edit(index: usize, update: ReplyUpdate) -> anyhow::Result<(String, String)> {
    Ok(match update {
        ReplyUpdate::Redact => (
            format!("$.replies[{index}].text"),
            serde_json::to_string(DELETED_TEXT)?,
        ),
        ReplyUpdate::Report => (format!("$.replies[{index}].reported"), "true".to_string()),
    })
}

fn decode(document: &str) -> anyhow::Result<Thread> {
    serde_json::from_str(document).context("corrupt thread document")
}

#[async_trait]
impl ThreadRepo for SqliteThreadRepo {
    async fn insert_thread(&self, thread: &Thread) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO threads (id, board, bumped_on, document) VALUES (?, ?, ?, ?)")
            .bind(thread.id.to_string())
            .bind(thread.board.as_str())
            .bind(bump_key(thread))
            .bind(serde_json::to_string(thread)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>> {
        let row = sqlx::query("SELECT document FROM threads WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| decode(&row.try_get::<String, _>("document")?))
            .transpose()
    }

    async fn list_threads(&self, board: &str, limit: usize) -> anyhow::Result<Vec<Thread>> {
        let rows = sqlx::query(
            "SELECT document FROM threads WHERE board = ? ORDER BY bumped_on DESC, id DESC LIMIT ?",
        )
        .bind(board)
        .bind(i64::try_from(limit)?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| decode(&row.try_get::<String, _>("document")?))
            .collect()
    }

    async fn push_reply(&self, thread_id: Uuid, reply: &Reply) -> anyhow::Result<bool> {
        let bump = reply.created_on.timestamp_micros();
        let result = sqlx::query(
            "UPDATE threads SET
                document = json_set(
                    json_insert(document, '$.replies[#]', json(?)),
                    '$.bumped_on',
                    CASE WHEN ? > bumped_on THEN ? ELSE json_extract(document, '$.bumped_on') END
                ),
                bumped_on = MAX(bumped_on, ?)
            WHERE id = ?",
        )
        .bind(serde_json::to_string(reply)?)
        .bind(bump)
        .bind(reply.created_on.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .bind(bump)
        .bind(thread_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_reply(
        &self,
        thread_id: Uuid,
        index: usize,
        reply_id: Uuid,
        update: ReplyUpdate,
    ) -> anyhow::Result<bool> {
        let (path, value) = reply_edit(index, update)?;
        let result = sqlx::query(
            "UPDATE threads SET document = json_set(document, ?, json(?))
            WHERE id = ? AND json_extract(document, ?) = ?",
        )
        .bind(path)
        .bind(value)
        .bind(thread_id.to_string())
        .bind(format!("$.replies[{index}]._id"))
        .bind(reply_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_thread(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM threads WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_thread_reported(&self, id: Uuid) -> anyhow::Result<bool> {
        let result =
            sqlx::query("UPDATE threads SET document = json_set(document, '$.reported', json('true')) WHERE id = ?")
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
        log::info!("thread store closed");
    }
}
