//! Storage error types.

use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be opened.
    #[error("storage connection failed: {0}")]
    Connection(String),

    /// A namespace or key was malformed.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Entity serialization or deserialization failed.
    #[error("storage serialization failed: {0}")]
    Serialization(String),

    /// A uniqueness constraint was violated.
    #[error("storage conflict: {0}")]
    Conflict(String),

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend failure.
    #[error("storage internal error: {0}")]
    Internal(String),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
