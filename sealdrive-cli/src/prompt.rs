//! Terminal passphrase entry.

use async_trait::async_trait;
use sealdrive_crypto::Passphrase;
use sealdrive_drive::{PassphrasePrompt, PromptPurpose};
use tracing::{debug, warn};

/// Reads passphrases from the controlling terminal without echo.
///
/// An empty entry cancels. Encryption asks twice and cancels on mismatch.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read(label: String) -> Option<String> {
        match rpassword::prompt_password(label) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "could not read passphrase from terminal");
                None
            }
        }
    }

    fn ask(purpose: &PromptPurpose) -> Option<Passphrase> {
        let entry = Self::read(format!("{purpose}: "))?;
        if entry.is_empty() {
            debug!("passphrase entry cancelled");
            return None;
        }
        if let PromptPurpose::Encrypt { .. } = purpose {
            let confirm = Self::read("Confirm passphrase: ".to_string())?;
            if confirm != entry {
                warn!("passphrases did not match");
                return None;
            }
        }
        Passphrase::try_from(entry).ok()
    }
}

#[async_trait]
impl PassphrasePrompt for TerminalPrompt {
    async fn request(&self, purpose: PromptPurpose) -> Option<Passphrase> {
        tokio::task::spawn_blocking(move || Self::ask(&purpose))
            .await
            .ok()
            .flatten()
    }
}
