//! Subcommands and their execution against a [`LifecycleManager`].

use crate::config::CliConfig;
use anyhow::{Context, Result, bail};
use clap::Subcommand;
use sealdrive_drive::{
    LifecycleManager, PassphrasePrompt, StoredObject, UploadRequest, recent, sanitize_filename,
    starred,
};
use sealdrive_store::{FileRecordStore, LocalBlobStore};
use sealdrive_types::{ObjectId, OwnerId};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Encrypt and store a file
    Upload {
        file: PathBuf,

        /// Store without encryption
        #[arg(long)]
        plain: bool,
    },

    /// Fetch and decrypt a file
    Download {
        id: String,

        /// Output path (defaults to the stored filename)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List files, newest first
    List {
        /// List the trash instead of active files
        #[arg(long)]
        trash: bool,

        /// Only starred files
        #[arg(long)]
        starred: bool,

        /// Only the most recent files
        #[arg(long)]
        recent: bool,
    },

    /// Move a file to the trash
    Trash { id: String },

    /// Restore a file from the trash
    Restore { id: String },

    /// Permanently delete a trashed file
    Purge { id: String },

    /// Star a file
    Star { id: String },

    /// Remove a star
    Unstar { id: String },

    /// Report inconsistencies between active files and the trash
    Check,
}

/// A manager bound to one owner.
pub struct Session {
    manager: LifecycleManager,
    owner: OwnerId,
}

impl Session {
    /// Opens the on-disk stores under `config.data_dir`.
    pub async fn open(config: &CliConfig, owner: OwnerId) -> Result<Self> {
        let blobs = LocalBlobStore::open(config.blob_dir())
            .await
            .context("Failed to open blob directory")?;
        let records = FileRecordStore::open(config.record_dir())
            .await
            .context("Failed to open record directory")?;
        let manager =
            LifecycleManager::new(Arc::new(blobs), Arc::new(records), config.drive.clone())
                .context("Invalid drive configuration")?;
        info!(data_dir = ?config.data_dir, owner = %owner, "session opened");
        Ok(Self::new(manager, owner))
    }

    pub fn new(manager: LifecycleManager, owner: OwnerId) -> Self {
        Self { manager, owner }
    }

    pub fn manager(&self) -> &LifecycleManager {
        &self.manager
    }

    /// Runs one command, writing human-readable output to `out`.
    pub async fn run(
        &self,
        command: Command,
        prompt: &dyn PassphrasePrompt,
        out: &mut dyn Write,
    ) -> Result<()> {
        debug!(?command, "running command");
        let owner = &self.owner;
        match command {
            Command::Upload { file, plain } => {
                let request = read_upload(&file).await?;
                let uploaded = if plain {
                    self.manager.upload_unencrypted(owner, request).await
                } else {
                    self.manager.upload(owner, request, prompt).await
                };
                let object =
                    uploaded.with_context(|| format!("Upload of {} failed", file.display()))?;
                writeln!(out, "{}", object.id)?;
            }
            Command::Download { id, out: target } => {
                let id = parse_id(&id)?;
                let file = self
                    .manager
                    .download(owner, &id, prompt)
                    .await
                    .with_context(|| format!("Download of {id} failed"))?;
                let target =
                    target.unwrap_or_else(|| PathBuf::from(sanitize_filename(&file.filename)));
                tokio::fs::write(&target, &file.bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                writeln!(out, "saved {} ({} bytes)", target.display(), file.bytes.len())?;
            }
            Command::List {
                trash,
                starred: only_starred,
                recent: only_recent,
            } => {
                let mut objects = if trash {
                    self.manager.list_trashed(owner).await?
                } else {
                    self.manager.list_active(owner).await?
                };
                if only_starred {
                    objects = starred(&objects);
                }
                if only_recent {
                    objects = recent(&objects, self.manager.config().recent_limit);
                }
                for object in &objects {
                    writeln!(out, "{}", format_row(object))?;
                }
            }
            Command::Trash { id } => {
                let id = parse_id(&id)?;
                let trashed = self.manager.move_to_trash(owner, &id).await?;
                writeln!(out, "trashed {} as {}", id, trashed.id)?;
            }
            Command::Restore { id } => {
                let id = parse_id(&id)?;
                let restored = self.manager.restore(owner, &id).await?;
                writeln!(out, "restored {} as {}", id, restored.id)?;
            }
            Command::Purge { id } => {
                let id = parse_id(&id)?;
                self.manager.purge(owner, &id).await?;
                writeln!(out, "purged {id}")?;
            }
            Command::Star { id } => {
                let id = parse_id(&id)?;
                self.manager.set_starred(owner, &id, true).await?;
                writeln!(out, "starred {id}")?;
            }
            Command::Unstar { id } => {
                let id = parse_id(&id)?;
                self.manager.set_starred(owner, &id, false).await?;
                writeln!(out, "unstarred {id}")?;
            }
            Command::Check => {
                let report = self.manager.check_integrity(owner).await?;
                writeln!(
                    out,
                    "{} active, {} trashed, {} warning(s)",
                    report.active,
                    report.trashed,
                    report.warnings.len()
                )?;
                for warning in &report.warnings {
                    writeln!(out, "  {warning}")?;
                }
                if !report.is_clean() {
                    bail!("integrity check found {} warning(s)", report.warnings.len());
                }
            }
        }
        Ok(())
    }
}

fn parse_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse(id).with_context(|| format!("Invalid object id {id:?}"))
}

async fn read_upload(path: &Path) -> Result<UploadRequest> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(UploadRequest::new(filename, guess_content_type(path), bytes))
}

/// Content type from the file extension; unknown extensions are opaque bytes.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

/// One line of `list` output: id, flags, size, creation millis, filename.
pub fn format_row(object: &StoredObject) -> String {
    let record = &object.record;
    format!(
        "{}  {}{}  {:>10}  {}  {}",
        object.id,
        if record.is_encrypted { 'E' } else { '-' },
        if record.starred { '*' } else { '-' },
        record.size_original,
        record.created_at.as_millis(),
        record.filename,
    )
}
