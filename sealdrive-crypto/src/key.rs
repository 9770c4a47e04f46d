//! Key derivation and management.
//!
//! Uses PBKDF2-HMAC-SHA256 to stretch a passphrase into an AES-256 key.

use crate::error::{CryptoError, CryptoResult};
use crate::passphrase::Passphrase;
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of encryption keys in bytes (256 bits for AES-256).
pub const KEY_SIZE: usize = 32;

/// Size of salt in bytes.
pub const SALT_SIZE: usize = 16;

/// Iteration count used for new encryptions.
///
/// Recorded per object, so raising it never breaks existing ciphertexts.
pub const DEFAULT_ITERATIONS: u32 = 250_000;

/// A derived encryption key with automatic zeroization on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Creates a derived key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Salt for key derivation. A fresh one is drawn for every encryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt {
    bytes: [u8; SALT_SIZE],
}

impl Salt {
    /// Generates a random salt from the OS CSPRNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a salt from raw bytes.
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates a salt from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; SALT_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidSaltLength {
            expected: SALT_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self { bytes })
    }

    /// Returns the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
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
            .map_err(|e| CryptoError::MetadataIncomplete(format!("salt_b64 is not base64: {e}")))?;
        Self::from_slice(&bytes)
    }
}

/// Key derivation parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdfParams {
    /// PBKDF2 iteration count.
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Creates parameters with an explicit iteration count.
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Creates parameters for testing (fast but insecure).
    #[cfg(test)]
    pub fn test() -> Self {
        Self { iterations: 1_000 }
    }
}

/// Derives an encryption key from a passphrase using PBKDF2-HMAC-SHA256.
///
/// Deterministic for identical inputs. The passphrase type guarantees the
/// input is non-empty.
///
/// # Arguments
/// * `passphrase` - The user's passphrase
/// * `salt` - The salt recorded for this object
/// * `iterations` - The iteration count recorded for this object
pub fn derive_key(
    passphrase: &Passphrase,
    salt: &Salt,
    iterations: u32,
) -> CryptoResult<DerivedKey> {
    if iterations == 0 {
        return Err(CryptoError::InvalidIterations(iterations));
    }

    let mut key_bytes = stretch(passphrase.as_bytes(), salt.as_bytes(), iterations);
    let key = DerivedKey::from_bytes(key_bytes);
    key_bytes.zeroize();
    Ok(key)
}

fn stretch(passphrase: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_SIZE] {
    let mut out = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, iterations, &mut out);
    out
}
