//! Lifecycle manager configuration.

use crate::error::{DriveError, DriveResult};
use sealdrive_crypto::{DEFAULT_ITERATIONS, KdfParams};
use serde::{Deserialize, Serialize};

/// Configuration for the lifecycle manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Collection holding Active records.
    pub active_collection: String,
    /// Collection holding Trashed records.
    pub trash_collection: String,
    /// Blob path prefix for uploads.
    pub blob_prefix: String,
    /// PBKDF2 iterations for new uploads. Existing objects keep their own.
    pub kdf_iterations: u32,
    /// Number of objects in the "recent" view.
    pub recent_limit: usize,
    /// Content type stored with ciphertext blobs.
    pub stored_content_type: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            active_collection: "myfiles".to_string(),
            trash_collection: "trash".to_string(),
            blob_prefix: "files".to_string(),
            kdf_iterations: DEFAULT_ITERATIONS,
            recent_limit: 10,
            stored_content_type: "application/octet-stream".to_string(),
        }
    }
}

impl DriveConfig {
    /// Lowest iteration count accepted for new uploads.
    pub const MIN_KDF_ITERATIONS: u32 = DEFAULT_ITERATIONS;

    /// Checks the configuration before it is used.
    pub fn validate(&self) -> DriveResult<()> {
        if self.kdf_iterations < Self::MIN_KDF_ITERATIONS {
            return Err(DriveError::Input(format!(
                "kdf_iterations must be at least {}, got {}",
                Self::MIN_KDF_ITERATIONS,
                self.kdf_iterations
            )));
        }
        for (name, value) in [
            ("active_collection", &self.active_collection),
            ("trash_collection", &self.trash_collection),
        ] {
            if value.is_empty() || value.contains('/') {
                return Err(DriveError::Input(format!("invalid {name}: {value:?}")));
            }
        }
        if self.active_collection == self.trash_collection {
            return Err(DriveError::Input(
                "active and trash collections must differ".to_string(),
            ));
        }
        let prefix_ok = !self.blob_prefix.is_empty()
            && self
                .blob_prefix
                .split('/')
                .all(|s| !s.is_empty() && s != "." && s != "..");
        if !prefix_ok {
            return Err(DriveError::Input(format!(
                "invalid blob_prefix: {:?}",
                self.blob_prefix
            )));
        }
        Ok(())
    }

    /// KDF parameters for new uploads.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams::new(self.kdf_iterations)
    }
}
