//! Error types for the core library
//!
//! Cache failures are deliberately absent here: they are reported as
//! [`CacheError`](crate::cache::CacheError) and absorbed by the repository.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Task not found: {0}")]
    NotFound(i64),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl Error {
    /// Create a ValidationFailed error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }

    /// Whether this error means the requested task does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
