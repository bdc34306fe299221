//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Reply, ReplyUpdate, Thread};

/// Data persistence contract for thread documents (replies embedded).
///
/// Writes touch only the fields they change, so concurrent writers to one
/// thread never undo each other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThreadRepo: Send + Sync {
    async fn insert_thread(&self, thread: &Thread) -> anyhow::Result<()>;
    async fn find_thread(&self, id: Uuid) -> anyhow::Result<Option<Thread>>;
    /// Most recently bumped threads of a board, newest first.
    async fn list_threads(&self, board: &str, limit: usize) -> anyhow::Result<Vec<Thread>>;

    /// Appends to the reply list and bumps `bumped_on` (never backwards).
    /// Returns `false` if the thread no longer exists.
    async fn push_reply(&self, thread_id: Uuid, reply: &Reply) -> anyhow::Result<bool>;
    /// Changes one field of the reply at `index`, provided it still carries
    /// `reply_id`. Returns `false` if nothing matched.
    async fn update_reply(
        &self,
        thread_id: Uuid,
        index: usize,
        reply_id: Uuid,
        update: ReplyUpdate,
    ) -> anyhow::Result<bool>;
    /// Hard delete, replies included. Returns `false` if nothing matched.
    async fn delete_thread(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Sets the reported flag in place. Returns `false` if nothing matched.
    async fn mark_thread_reported(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Releases the underlying connection(s).
    async fn close(&self);
}

/// Delete-password contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Turns a submitted password into the value that gets stored.
    fn seal_password(&self, password: &str) -> anyhow::Result<String>;

    /// Checks a submitted password against the stored value.
    async fn verify_password(&self, candidate: &str, stored: &str) -> bool;
}
