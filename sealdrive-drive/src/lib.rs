//! Encrypted object lifecycle for sealdrive.
//!
//! [`LifecycleManager`] drives every object through its states:
//!
//! ```text
//! upload ──▶ Active ──move_to_trash──▶ Trashed ──purge──▶ (gone)
//!              ▲                           │
//!              └────────── restore ────────┘
//! ```
//!
//! Records follow the [`ObjectRecord`] schema. Encrypted objects carry their
//! encryption parameters in the record; the passphrase comes from a
//! caller-supplied [`PassphrasePrompt`] and is never stored.

mod config;
mod error;
mod integrity;
mod lifecycle;
mod listing;
mod prompt;
mod schema;
mod upload;

pub use config::DriveConfig;
pub use error::{DriveError, DriveResult};
pub use integrity::{IntegrityReport, IntegrityWarning, check as check_records};
pub use lifecycle::LifecycleManager;
pub use listing::{Listing, decode_snapshot, recent, sort_newest_first, starred};
pub use prompt::{FixedPassphrase, PassphrasePrompt, PromptPurpose};
pub use schema::{ObjectRecord, ObjectState, SCHEMA_VERSION, StoredObject};
pub use upload::{DownloadedFile, UploadRequest, blob_path, sanitize_filename};
