//! Passphrase capability.
//!
//! The lifecycle manager never knows where a passphrase comes from. Callers
//! hand it a [`PassphrasePrompt`] per operation.

use async_trait::async_trait;
use sealdrive_crypto::Passphrase;
use std::fmt;

/// Why a passphrase is being requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPurpose {
    Encrypt { filename: String },
    Decrypt { filename: String },
}

impl PromptPurpose {
    pub fn filename(&self) -> &str {
        match self {
            Self::Encrypt { filename } | Self::Decrypt { filename } => filename,
        }
    }
}

impl fmt::Display for PromptPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypt { filename } => write!(f, "Passphrase to encrypt \"{filename}\""),
            Self::Decrypt { filename } => write!(f, "Passphrase to decrypt \"{filename}\""),
        }
    }
}

/// Supplies a passphrase, or `None` if the user cancelled.
#[async_trait]
pub trait PassphrasePrompt: Send + Sync {
    async fn request(&self, purpose: PromptPurpose) -> Option<Passphrase>;
}

/// Always answers with the same passphrase.
#[derive(Debug, Clone)]
pub struct FixedPassphrase {
    passphrase: Passphrase,
}

impl FixedPassphrase {
    pub fn new(passphrase: Passphrase) -> Self {
        Self { passphrase }
    }
}

#[async_trait]
impl PassphrasePrompt for FixedPassphrase {
    async fn request(&self, _purpose: PromptPurpose) -> Option<Passphrase> {
        Some(self.passphrase.clone())
    }
}
