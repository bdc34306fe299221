//! # AppError
//!
//! Centralized error handling for the Rusty-Board ecosystem.
//! Two tiers reach the caller: a lookup miss, or everything else.

use thiserror::Error;

/// The primary error type for all rb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Thread, Reply)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// A required field was missing or empty
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A thread id was supplied but is not an identifier at all
    #[error("malformed identifier: {0}")]
    InvalidId(String),

    /// Infrastructure failure (e.g., DB down, corrupt document)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn thread_not_found(id: String) -> Self {
        AppError::NotFound("Thread".to_string(), id)
    }

    pub fn reply_not_found(id: String) -> Self {
        AppError::NotFound("Reply".to_string(), id)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{err:#}"))
    }
}

/// A specialized Result type for Rusty-Board logic.
pub type Result<T> = std::result::Result<T, AppError>;
