//! The user-supplied secret.

use crate::error::{CryptoError, CryptoResult};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A non-empty passphrase, zeroized on drop.
///
/// This is the only secret in the system. It is never persisted, transmitted,
/// or logged; `Debug` output is redacted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Passphrase {
    bytes: Vec<u8>,
}

impl Passphrase {
    /// Wraps raw passphrase bytes, rejecting an empty value.
    pub fn new(bytes: impl Into<Vec<u8>>) -> CryptoResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(CryptoError::EmptyPassphrase);
        }
        Ok(Self { bytes })
    }

    /// Returns the passphrase bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl TryFrom<&str> for Passphrase {
    type Error = CryptoError;

    fn try_from(value: &str) -> CryptoResult<Self> {
        Self::new(value.as_bytes())
    }
}

impl TryFrom<String> for Passphrase {
    type Error = CryptoError;

    fn try_from(value: String) -> CryptoResult<Self> {
        Self::new(value.into_bytes())
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passphrase")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
