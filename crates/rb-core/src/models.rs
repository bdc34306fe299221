//! # Domain Models
//!
//! A Thread is the only stored document. Replies live inside it, in insertion
//! order, and have no identity outside their parent.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Maximum number of threads returned by the board listing.
pub const LIST_THREAD_LIMIT: usize = 10;

/// Number of most recent replies shown per thread in the board listing.
pub const PREVIEW_REPLY_LIMIT: usize = 3;

/// Text a reply carries after its author deleted it.
pub const DELETED_TEXT: &str = "[deleted]";

/// A response embedded within a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
    #[serde(default)]
    pub reported: bool,
    pub delete_password: String,
}

impl Reply {
    pub fn new(text: String, delete_password: String, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            text: required("text", text)?,
            created_on: now,
            reported: false,
            delete_password: required("delete_password", delete_password)?,
        })
    }
}

/// In-place change to one embedded reply. Replies are never removed, so a
/// reply keeps its position in the thread for the thread's whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyUpdate {
    /// Soft delete: the record stays in place, only its text is replaced.
    Redact,
    Report,
}

/// Top-level discussion post on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// The board name this thread was posted to (e.g. "test-board")
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    /// The timestamp used for sorting threads by activity
    pub bumped_on: DateTime<Utc>,
    #[serde(default)]
    pub reported: bool,
    pub delete_password: String,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl Thread {
    pub fn new(
        board: &str,
        text: String,
        delete_password: String,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            board: required("board", board.to_string())?,
            text: required("text", text)?,
            created_on: now,
            bumped_on: now,
            reported: false,
            delete_password: required("delete_password", delete_password)?,
            replies: Vec::new(),
        })
    }

    /// Appends a reply and bumps the thread to the reply's creation time.
    /// `bumped_on` never moves backwards.
    pub fn push_reply(&mut self, reply: Reply) {
        if reply.created_on > self.bumped_on {
            self.bumped_on = reply.created_on;
        }
        self.replies.push(reply);
    }

    pub fn reply_index(&self, reply_id: Uuid) -> Option<usize> {
        self.replies.iter().position(|r| r.id == reply_id)
    }
}

/// Mirrors a schema "required" rule: absent and empty values are both rejected.
fn required(field: &str, value: String) -> Result<String> {
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("`{field}` is required")));
    }
    Ok(value)
}

/// A reply as exposed by the read endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicReply {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
}

impl From<&Reply> for PublicReply {
    fn from(reply: &Reply) -> Self {
        Self {
            id: reply.id,
            text: reply.text.clone(),
            created_on: reply.created_on,
        }
    }
}

/// A thread as exposed by the read endpoints: no password, no report flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<PublicReply>,
}

impl ThreadSummary {
    /// Board listing shape: only the last few replies, oldest first.
    pub fn preview(thread: &Thread) -> Self {
        let skip = thread.replies.len().saturating_sub(PREVIEW_REPLY_LIMIT);
        Self::with_replies(thread, &thread.replies[skip..])
    }

    /// Single thread shape: every reply.
    pub fn full(thread: &Thread) -> Self {
        Self::with_replies(thread, &thread.replies)
    }

    fn with_replies(thread: &Thread, replies: &[Reply]) -> Self {
        Self {
            id: thread.id,
            text: thread.text.clone(),
            created_on: thread.created_on,
            bumped_on: thread.bumped_on,
            replies: replies.iter().map(PublicReply::from).collect(),
        }
    }
}

/// Response to thread creation. Echoes the stored record, password included.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedThread {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub reported: bool,
    pub delete_password: String,
    pub replies: Vec<Reply>,
}

impl From<Thread> for CreatedThread {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.id,
            text: thread.text,
            created_on: thread.created_on,
            bumped_on: thread.bumped_on,
            reported: thread.reported,
            delete_password: thread.delete_password,
            replies: thread.replies,
        }
    }
}

/// Response to a new reply: the updated thread with its raw reply records.
#[derive(Debug, Clone, Serialize)]
pub struct BumpedThread {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<Reply>,
}

impl From<Thread> for BumpedThread {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.id,
            text: thread.text,
            created_on: thread.created_on,
            bumped_on: thread.bumped_on,
            replies: thread.replies,
        }
    }
}

/// Result of a password-checked delete. A mismatch is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    IncorrectPassword,
}

impl DeleteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted => "success",
            DeleteOutcome::IncorrectPassword => "incorrect password",
        }
    }
}

/// Body returned by both report endpoints.
pub const REPORTED: &str = "reported";
