//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in blob or record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Blob or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store refused the write: an absent sentinel, an invalid path, or
    /// an invalid collection name.
    #[error("write rejected: {0}")]
    Rejected(String),

    /// Transient service fault. Safe for the caller to retry the whole
    /// operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns true for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if retrying the operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}
