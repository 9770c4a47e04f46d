//! Authenticated encryption using AES-256-GCM.
//!
//! The 16-byte authentication tag is appended to the ciphertext. The IV is
//! kept separately because it is persisted in the object's metadata record,
//! not alongside the blob.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// Size of the IV in bytes (96 bits for AES-GCM).
pub const IV_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Initialization vector for a single encryption. Never reused with a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Iv {
    bytes: [u8; IV_SIZE],
}

impl Iv {
    /// Generates a random IV from the OS CSPRNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; IV_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates an IV from raw bytes.
    pub fn from_bytes(bytes: [u8; IV_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates an IV from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; IV_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidIvLength {
            expected: IV_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self { bytes })
    }

    /// Returns the IV bytes.
    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.bytes
    }

    /// Encodes to standard base64 for storage.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    /// Decodes from base64, ignoring surrounding whitespace.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::MetadataIncomplete(format!("iv_b64 is not base64: {e}")))?;
        Self::from_slice(&bytes)
    }
}

/// Encrypts plaintext using AES-256-GCM.
///
/// # Returns
/// Ciphertext with the authentication tag appended.
pub fn encrypt(key: &DerivedKey, iv: &Iv, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(iv.as_bytes());

    cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))
}

/// Decrypts ciphertext using AES-256-GCM.
///
/// Any authentication failure maps to the same opaque
/// [`CryptoError::DecryptionFailed`].
pub fn decrypt(key: &DerivedKey, iv: &Iv, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::DecryptionFailed);
    }

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(iv.as_bytes());

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
