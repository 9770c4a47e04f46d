//! Error types for the encryption codec.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// An empty passphrase was supplied.
    #[error("passphrase must not be empty")]
    EmptyPassphrase,

    /// The KDF iteration count is not usable.
    #[error("invalid iteration count: {0}")]
    InvalidIterations(u32),

    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Authentication failed: wrong passphrase, tampered ciphertext, or
    /// altered parameters. Deliberately carries no detail.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Stored encryption metadata is missing or malformed. Detected before
    /// any cipher call.
    #[error("encryption metadata incomplete: {0}")]
    MetadataIncomplete(String),

    /// Invalid salt length.
    #[error("invalid salt length: expected {expected}, got {actual}")]
    InvalidSaltLength { expected: usize, actual: usize },

    /// Invalid IV length.
    #[error("invalid iv length: expected {expected}, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
