//! Encryption codec for sealdrive.
//!
//! Pure functions, no I/O:
//! - [`derive_key`] stretches a [`Passphrase`] with PBKDF2-HMAC-SHA256
//! - [`encrypt`] / [`decrypt`] seal and open object bytes with AES-256-GCM
//! - [`EncryptionParameters`] / [`CryptoMetadata`] describe how an object was
//!   encrypted, in validated and persisted form respectively
//!
//! Key derivation is deliberately slow. Async callers should run
//! [`encrypt`] and [`decrypt`] on a blocking thread.

mod cipher;
mod codec;
mod error;
mod key;
mod params;
mod passphrase;

pub use cipher::{IV_SIZE, Iv, TAG_SIZE};
pub use codec::{Sealed, decrypt, decrypt_with_metadata, encrypt, encrypt_with_params};
pub use error::{CryptoError, CryptoResult};
pub use key::{DEFAULT_ITERATIONS, DerivedKey, KEY_SIZE, KdfParams, SALT_SIZE, Salt, derive_key};
pub use params::{Algorithm, CryptoMetadata, EncryptionParameters, Kdf};
pub use passphrase::Passphrase;

/// Low-level AES-256-GCM primitives operating on an already-derived key.
pub mod raw {
    pub use crate::cipher::{decrypt, encrypt};
}
