//! Error types for the lifecycle manager.

use sealdrive_crypto::CryptoError;
use sealdrive_store::StoreError;
use thiserror::Error;

/// Result type for drive operations.
pub type DriveResult<T> = Result<T, DriveError>;

/// Errors surfaced by [`LifecycleManager`](crate::LifecycleManager) operations.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Caller supplied unusable input: no file, empty name, bad configuration.
    #[error("invalid input: {0}")]
    Input(String),

    /// The passphrase prompt was dismissed.
    #[error("operation cancelled")]
    Cancelled,

    /// An encrypted record lacks usable encryption parameters. The object
    /// cannot be decrypted with any passphrase.
    #[error("encryption metadata incomplete: {0}")]
    MetadataIncomplete(String),

    /// Wrong passphrase or tampered data. Deliberately opaque.
    #[error("decryption failed")]
    AuthenticationFailure,

    /// Blob or record store failure.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// No such object for this owner.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Stored data violates a consistency rule.
    #[error("integrity fault: {0}")]
    Integrity(String),

    /// Codec failure other than authentication.
    #[error("crypto error: {0}")]
    Crypto(CryptoError),

    /// A blocking codec task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl DriveError {
    /// Returns true if retrying the whole operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<CryptoError> for DriveError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::DecryptionFailed => Self::AuthenticationFailure,
            CryptoError::MetadataIncomplete(reason) => Self::MetadataIncomplete(reason),
            CryptoError::EmptyPassphrase => Self::Input(err.to_string()),
            other => Self::Crypto(other),
        }
    }
}
