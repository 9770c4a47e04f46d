//! Encryption parameters and their persisted wire format.
//!
//! [`EncryptionParameters`] is the validated, in-memory form. [`CryptoMetadata`]
//! is the shape stored in the record store:
//!
//! ```text
//! { alg: "AES-GCM", kdf: "PBKDF2-SHA256", iters: <int>, salt_b64: <base64>, iv_b64: <base64> }
//! ```
//!
//! Every wire field is optional at the serde level so that incomplete records
//! still load. Converting to [`EncryptionParameters`] fails with
//! [`CryptoError::MetadataIncomplete`] on any defect. No field is ever
//! defaulted: guessing a parameter for existing ciphertext is never correct.

use crate::cipher::Iv;
use crate::error::{CryptoError, CryptoResult};
use crate::key::Salt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated cipher identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// AES-GCM with a 256-bit key.
    AesGcm,
}

impl Algorithm {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AesGcm => "AES-GCM",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AES-GCM" => Some(Self::AesGcm),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-derivation identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kdf {
    /// PBKDF2 over HMAC-SHA256.
    Pbkdf2Sha256,
}

impl Kdf {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pbkdf2Sha256 => "PBKDF2-SHA256",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PBKDF2-SHA256" => Some(Self::Pbkdf2Sha256),
            _ => None,
        }
    }
}

impl fmt::Display for Kdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed, besides the passphrase, to decrypt one object.
///
/// Immutable once created: restoring or moving a record must carry these
/// values verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptionParameters {
    pub algorithm: Algorithm,
    pub kdf: Kdf,
    pub iterations: u32,
    pub salt: Salt,
    pub iv: Iv,
}

impl EncryptionParameters {
    /// Parameters for the only supported suite.
    pub fn new(iterations: u32, salt: Salt, iv: Iv) -> Self {
        Self {
            algorithm: Algorithm::AesGcm,
            kdf: Kdf::Pbkdf2Sha256,
            iterations,
            salt,
            iv,
        }
    }

    /// Converts to the persisted wire format.
    pub fn to_metadata(&self) -> CryptoMetadata {
        CryptoMetadata::from(self)
    }
}

/// Persisted form of [`EncryptionParameters`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iters: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt_b64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iv_b64: Option<String>,
}

impl CryptoMetadata {
    /// Validates every field and builds [`EncryptionParameters`].
    ///
    /// All defects are collected into a single
    /// [`CryptoError::MetadataIncomplete`] so an operator sees the whole
    /// problem at once.
    pub fn validate(&self) -> CryptoResult<EncryptionParameters> {
        let mut defects = Vec::new();

        let algorithm = match self.alg.as_deref().map(str::trim) {
            None | Some("") => {
                defects.push("alg missing".to_string());
                None
            }
            Some(s) => Algorithm::parse(s).or_else(|| {
                defects.push(format!("alg unsupported: {s}"));
                None
            }),
        };

        let kdf = match self.kdf.as_deref().map(str::trim) {
            None | Some("") => {
                defects.push("kdf missing".to_string());
                None
            }
            Some(s) => Kdf::parse(s).or_else(|| {
                defects.push(format!("kdf unsupported: {s}"));
                None
            }),
        };

        let iterations = match self.iters {
            None => {
                defects.push("iters missing".to_string());
                None
            }
            Some(0) => {
                defects.push("iters must be positive".to_string());
                None
            }
            Some(n) => Some(n),
        };

        let salt = match self.salt_b64.as_deref().map(str::trim) {
            None | Some("") => {
                defects.push("salt_b64 missing".to_string());
                None
            }
            Some(s) => Salt::from_base64(s)
                .map_err(|e| defects.push(format!("salt_b64 malformed ({e})")))
                .ok(),
        };

        let iv = match self.iv_b64.as_deref().map(str::trim) {
            None | Some("") => {
                defects.push("iv_b64 missing".to_string());
                None
            }
            Some(s) => Iv::from_base64(s)
                .map_err(|e| defects.push(format!("iv_b64 malformed ({e})")))
                .ok(),
        };

        match (algorithm, kdf, iterations, salt, iv) {
            (Some(algorithm), Some(kdf), Some(iterations), Some(salt), Some(iv))
                if defects.is_empty() =>
            {
                Ok(EncryptionParameters {
                    algorithm,
                    kdf,
                    iterations,
                    salt,
                    iv,
                })
            }
            _ => Err(CryptoError::MetadataIncomplete(defects.join(", "))),
        }
    }

    /// Returns true when every field is present and well-formed.
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}

impl From<&EncryptionParameters> for CryptoMetadata {
    fn from(params: &EncryptionParameters) -> Self {
        Self {
            alg: Some(params.algorithm.as_str().to_string()),
            kdf: Some(params.kdf.as_str().to_string()),
            iters: Some(params.iterations),
            salt_b64: Some(params.salt.to_base64()),
            iv_b64: Some(params.iv.to_base64()),
        }
    }
}

impl TryFrom<&CryptoMetadata> for EncryptionParameters {
    type Error = CryptoError;

    fn try_from(meta: &CryptoMetadata) -> CryptoResult<Self> {
        meta.validate()
    }
}
