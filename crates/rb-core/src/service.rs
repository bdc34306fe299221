//! # Board Service
//!
//! Translates board operations into store calls and shapes their results.
//! Writes after creation go through targeted store updates, so two requests
//! touching the same thread never undo each other.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{DeleteOutcome, Reply, ReplyUpdate, Thread, ThreadSummary, LIST_THREAD_LIMIT};
use crate::traits::{AuthProvider, ThreadRepo};

/// Input for a new thread or reply. Missing fields arrive as empty strings.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub text: String,
    pub delete_password: String,
}

/// Holds the store client and password policy for the lifetime of the process.
#[derive(Clone)]
pub struct BoardService {
    repo: Arc<dyn ThreadRepo>,
    auth: Arc<dyn AuthProvider>,
}

impl BoardService {
    pub fn new(repo: Arc<dyn ThreadRepo>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { repo, auth }
    }

    pub async fn create_thread(&self, board: &str, post: NewPost) -> Result<Thread> {
        let mut thread = Thread::new(board, post.text, post.delete_password, Utc::now())?;
        thread.delete_password = self.auth.seal_password(&thread.delete_password)?;

        self.repo.insert_thread(&thread).await?;
        log::debug!("created thread {} on /{}/", thread.id, board);
        Ok(thread)
    }

    pub async fn append_reply(&self, thread_id: Option<&str>, post: NewPost) -> Result<Thread> {
        let mut thread = self.load(thread_id).await?;

        let mut reply = Reply::new(post.text, post.delete_password, Utc::now())?;
        reply.delete_password = self.auth.seal_password(&reply.delete_password)?;

        if !self.repo.push_reply(thread.id, &reply).await? {
            return Err(AppError::thread_not_found(thread.id.to_string()));
        }
        thread.push_reply(reply);
        Ok(thread)
    }

    pub async fn list_threads(&self, board: &str) -> Result<Vec<ThreadSummary>> {
        let threads = self.repo.list_threads(board, LIST_THREAD_LIMIT).await?;
        Ok(threads.iter().map(ThreadSummary::preview).collect())
    }

    pub async fn get_thread(&self, thread_id: Option<&str>) -> Result<ThreadSummary> {
        let thread = self.load(thread_id).await?;
        Ok(ThreadSummary::full(&thread))
    }

    pub async fn delete_thread(&self, thread_id: Option<&str>, password: &str) -> Result<DeleteOutcome> {
        let thread = self.load(thread_id).await?;

        if !self.auth.verify_password(password, &thread.delete_password).await {
            return Ok(DeleteOutcome::IncorrectPassword);
        }

        self.repo.delete_thread(thread.id).await?;
        log::debug!("deleted thread {}", thread.id);
        Ok(DeleteOutcome::Deleted)
    }

    /// Reporting an absent or unknown thread is a silent no-op, not a lookup
    /// miss. A malformed id still fails.
    pub async fn report_thread(&self, thread_id: Option<&str>) -> Result<()> {
        let Some(id) = parse_thread_id(thread_id)? else {
            return Ok(());
        };

        if !self.repo.mark_thread_reported(id).await? {
            log::debug!("report for unknown thread {id} ignored");
        }
        Ok(())
    }

    pub async fn delete_reply(
        &self,
        thread_id: Option<&str>,
        reply_id: Option<&str>,
        password: &str,
    ) -> Result<DeleteOutcome> {
        let thread = self.load(thread_id).await?;
        let (index, reply) = locate_reply(&thread, reply_id)?;

        if !self.auth.verify_password(password, &reply.delete_password).await {
            return Ok(DeleteOutcome::IncorrectPassword);
        }

        self.edit_reply(&thread, index, reply.id, ReplyUpdate::Redact).await?;
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn report_reply(&self, thread_id: Option<&str>, reply_id: Option<&str>) -> Result<()> {
        let thread = self.load(thread_id).await?;
        let (index, reply) = locate_reply(&thread, reply_id)?;

        self.edit_reply(&thread, index, reply.id, ReplyUpdate::Report).await
    }

    /// Closes the store. Call once, after the HTTP server has stopped.
    pub async fn shutdown(&self) {
        self.repo.close().await;
    }

    async fn load(&self, thread_id: Option<&str>) -> Result<Thread> {
        let id = parse_thread_id(thread_id)?
            .ok_or_else(|| AppError::thread_not_found(String::new()))?;
        self.repo
            .find_thread(id)
            .await?
            .ok_or_else(|| AppError::thread_not_found(id.to_string()))
    }

    async fn edit_reply(
        &self,
        thread: &Thread,
        index: usize,
        reply_id: Uuid,
        update: ReplyUpdate,
    ) -> Result<()> {
        // The thread may have been deleted since it was loaded.
        if !self.repo.update_reply(thread.id, index, reply_id, update).await? {
            return Err(AppError::thread_not_found(thread.id.to_string()));
        }
        Ok(())
    }
}

/// `None` when no thread id was sent. Anything sent must parse.
fn parse_thread_id(raw: Option<&str>) -> Result<Option<Uuid>> {
    raw.map(|raw| Uuid::parse_str(raw).map_err(|_| AppError::InvalidId(raw.to_string())))
        .transpose()
}

/// An absent or malformed reply id can never match a reply, so both are misses.
fn locate_reply<'t>(thread: &'t Thread, reply_id: Option<&str>) -> Result<(usize, &'t Reply)> {
    let raw = reply_id.unwrap_or_default();
    Uuid::parse_str(raw)
        .ok()
        .and_then(|id| thread.reply_index(id))
        .map(|index| (index, &thread.replies[index]))
        .ok_or_else(|| AppError::reply_not_found(raw.to_string()))
}
