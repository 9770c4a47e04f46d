//! Passphrase-based object encryption.
//!
//! # Process
//! 1. Draw a fresh random salt and IV
//! 2. Derive a key from the passphrase with PBKDF2-HMAC-SHA256
//! 3. Seal the plaintext with AES-256-GCM
//!
//! The returned [`EncryptionParameters`] carry everything except the
//! passphrase that is needed to reverse the process.

use crate::cipher::{self, Iv};
use crate::error::CryptoResult;
use crate::key::{KdfParams, Salt, derive_key};
use crate::params::{CryptoMetadata, EncryptionParameters};
use crate::passphrase::Passphrase;

/// Output of an encryption: the ciphertext and its parameters.
#[derive(Clone, Debug)]
pub struct Sealed {
    /// Ciphertext with the GCM tag appended.
    pub ciphertext: Vec<u8>,
    /// Parameters to persist alongside the object.
    pub params: EncryptionParameters,
}

/// Encrypts `plaintext` with the default iteration count.
pub fn encrypt(plaintext: &[u8], passphrase: &Passphrase) -> CryptoResult<Sealed> {
    encrypt_with_params(plaintext, passphrase, &KdfParams::default())
}

/// Encrypts `plaintext` with explicit KDF parameters.
pub fn encrypt_with_params(
    plaintext: &[u8],
    passphrase: &Passphrase,
    kdf: &KdfParams,
) -> CryptoResult<Sealed> {
    let salt = Salt::random();
    let iv = Iv::random();

    let key = derive_key(passphrase, &salt, kdf.iterations)?;
    let ciphertext = cipher::encrypt(&key, &iv, plaintext)?;

    Ok(Sealed {
        ciphertext,
        params: EncryptionParameters::new(kdf.iterations, salt, iv),
    })
}

/// Decrypts `ciphertext` with the parameters recorded at encryption time.
///
/// A wrong passphrase, tampered ciphertext, or altered parameters all fail
/// with the same [`CryptoError::DecryptionFailed`](crate::CryptoError::DecryptionFailed).
pub fn decrypt(
    ciphertext: &[u8],
    passphrase: &Passphrase,
    params: &EncryptionParameters,
) -> CryptoResult<Vec<u8>> {
    let key = derive_key(passphrase, &params.salt, params.iterations)?;
    cipher::decrypt(&key, &params.iv, ciphertext)
}

/// Validates persisted metadata, then decrypts.
///
/// Incomplete metadata is rejected before the KDF or cipher runs.
pub fn decrypt_with_metadata(
    ciphertext: &[u8],
    passphrase: &Passphrase,
    metadata: &CryptoMetadata,
) -> CryptoResult<Vec<u8>> {
    let params = metadata.validate()?;
    decrypt(ciphertext, passphrase, &params)
}
