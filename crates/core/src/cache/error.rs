//! Cache error types

use thiserror::Error;

/// A degraded cache operation
///
/// Never fatal to the surrounding repository operation.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to connect to the cache backend
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// Backend rejected or failed the command
    #[error("Cache backend error: {0}")]
    BackendError(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
