//! Lifecycle manager: Active → Trashed → Restored or Purged.
//!
//! # Ordering
//! - Trash: the Trashed copy is created before the Active record is deleted.
//! - Restore: the Active record is written before the Trashed copy is deleted.
//! - Purge: the blob is deleted first; the record is deleted only if the blob
//!   is gone.
//!
//! A failure between two steps leaves the object visible in at least one
//! state. Deleting something already absent is success.

use crate::config::DriveConfig;
use crate::error::{DriveError, DriveResult};
use crate::integrity::{self, IntegrityReport};
use crate::listing::{Listing, decode_snapshot};
use crate::prompt::{PassphrasePrompt, PromptPurpose};
use crate::schema::{ObjectRecord, ObjectState, SCHEMA_VERSION, StoredObject};
use crate::upload::{DownloadedFile, UploadRequest, blob_path};
use sealdrive_crypto::{CryptoMetadata, CryptoResult, EncryptionParameters, Passphrase, Sealed};
use sealdrive_store::{BlobStore, Document, Filter, RecordStore, SetMode};
use sealdrive_types::{ObjectId, OwnerId, Timestamp};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates object state transitions over a blob store and a record store.
pub struct LifecycleManager {
    blobs: Arc<dyn BlobStore>,
    records: Arc<dyn RecordStore>,
    config: DriveConfig,
}

impl LifecycleManager {
    /// Creates a manager after validating `config`.
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        records: Arc<dyn RecordStore>,
        config: DriveConfig,
    ) -> DriveResult<Self> {
        config.validate()?;
        Ok(Self {
            blobs,
            records,
            config,
        })
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    fn collection(&self, state: ObjectState) -> &str {
        state.collection(&self.config)
    }

    // ── Upload / download ────────────────────────────────────────

    /// Encrypts and stores a file, then creates its Active record.
    ///
    /// If the caller abandons the upload after the blob write, the blob stays
    /// behind and no record is created.
    pub async fn upload(
        &self,
        owner: &OwnerId,
        request: UploadRequest,
        prompt: &dyn PassphrasePrompt,
    ) -> DriveResult<StoredObject> {
        validate_request(&request)?;

        let passphrase = prompt
            .request(PromptPurpose::Encrypt {
                filename: request.filename.clone(),
            })
            .await
            .ok_or(DriveError::Cancelled)?;

        let size_original = request.bytes.len() as u64;
        let kdf = self.config.kdf_params();
        let UploadRequest {
            filename,
            content_type,
            bytes,
        } = request;
        let sealed: Sealed = run_codec(move || {
            sealdrive_crypto::encrypt_with_params(&bytes, &passphrase, &kdf)
        })
        .await?;

        let path = blob_path(&self.config.blob_prefix, &filename, true, Timestamp::now());
        let size_stored = sealed.ciphertext.len() as u64;
        let path = self
            .blobs
            .put(&path, sealed.ciphertext, &self.config.stored_content_type)
            .await?;

        let record = ObjectRecord {
            schema_version: SCHEMA_VERSION,
            owner: owner.clone(),
            filename,
            path,
            content_type_original: content_type,
            content_type_stored: self.config.stored_content_type.clone(),
            size_original,
            size_stored,
            is_encrypted: true,
            crypto: Some(CryptoMetadata::from(&sealed.params)),
            created_at: Timestamp::now(),
            deleted_at: None,
            starred: false,
            original_identity: None,
            extra: BTreeMap::new(),
        };
        self.create_active(record).await
    }

    /// Stores a file without encryption.
    pub async fn upload_unencrypted(
        &self,
        owner: &OwnerId,
        request: UploadRequest,
    ) -> DriveResult<StoredObject> {
        validate_request(&request)?;

        let UploadRequest {
            filename,
            content_type,
            bytes,
        } = request;
        let size = bytes.len() as u64;
        let path = blob_path(&self.config.blob_prefix, &filename, false, Timestamp::now());
        let path = self.blobs.put(&path, bytes, &content_type).await?;

        let record = ObjectRecord {
            schema_version: SCHEMA_VERSION,
            owner: owner.clone(),
            filename,
            path,
            content_type_original: content_type.clone(),
            content_type_stored: content_type,
            size_original: size,
            size_stored: size,
            is_encrypted: false,
            crypto: None,
            created_at: Timestamp::now(),
            deleted_at: None,
            starred: false,
            original_identity: None,
            extra: BTreeMap::new(),
        };
        self.create_active(record).await
    }

    async fn create_active(&self, record: ObjectRecord) -> DriveResult<StoredObject> {
        let collection = self.collection(ObjectState::Active);
        let id = self.records.create(collection, record.to_document()?).await?;
        let id = parse_store_id(&id)?;
        info!(
            object_id = %id,
            owner = %record.owner,
            path = %record.path,
            encrypted = record.is_encrypted,
            size = record.size_original,
            "object uploaded"
        );
        Ok(StoredObject { id, record })
    }

    /// Fetches and, if needed, decrypts an Active object.
    ///
    /// Incomplete encryption metadata is reported before the prompt is shown
    /// or the blob is fetched.
    pub async fn download(
        &self,
        owner: &OwnerId,
        id: &ObjectId,
        prompt: &dyn PassphrasePrompt,
    ) -> DriveResult<DownloadedFile> {
        let object = self.get_active(owner, id).await?;
        let record = object.record;

        let params = record.encryption_parameters().map_err(|e| {
            warn!(object_id = %id, error = %e, "encrypted object has incomplete metadata");
            DriveError::from(e)
        })?;

        let passphrase = match &params {
            Some(_) => Some(
                prompt
                    .request(PromptPurpose::Decrypt {
                        filename: record.filename.clone(),
                    })
                    .await
                    .ok_or(DriveError::Cancelled)?,
            ),
            None => None,
        };

        let stored = self.blobs.get(&record.path).await.map_err(|e| {
            if e.is_not_found() {
                DriveError::NotFound(format!("blob {} of object {id}", record.path))
            } else {
                e.into()
            }
        })?;

        let bytes = match (params, passphrase) {
            (Some(params), Some(passphrase)) => {
                decrypt_blocking(stored, passphrase, params)
                    .await
                    .inspect_err(|e| {
                        if matches!(e, DriveError::AuthenticationFailure) {
                            warn!(object_id = %id, owner = %owner, "decryption failed");
                        }
                    })?
            }
            _ => stored,
        };

        debug!(object_id = %id, size = bytes.len(), "object downloaded");
        Ok(DownloadedFile {
            filename: record.filename,
            content_type: record.content_type_original,
            bytes,
        })
    }

    // ── Lookups ──────────────────────────────────────────────────

    /// Reads an Active object owned by `owner`.
    pub async fn get_active(&self, owner: &OwnerId, id: &ObjectId) -> DriveResult<StoredObject> {
        self.get(ObjectState::Active, owner, id).await
    }

    /// Reads a Trashed object owned by `owner`.
    pub async fn get_trashed(&self, owner: &OwnerId, id: &ObjectId) -> DriveResult<StoredObject> {
        self.get(ObjectState::Trashed, owner, id).await
    }

    async fn get(
        &self,
        state: ObjectState,
        owner: &OwnerId,
        id: &ObjectId,
    ) -> DriveResult<StoredObject> {
        self.find(state, owner, id)
            .await?
            .ok_or_else(|| DriveError::NotFound(format!("{state} object {id}")))
    }

    async fn find(
        &self,
        state: ObjectState,
        owner: &OwnerId,
        id: &ObjectId,
    ) -> DriveResult<Option<StoredObject>> {
        let Some(doc) = self.records.get(self.collection(state), id.as_str()).await? else {
            return Ok(None);
        };
        let record = ObjectRecord::from_document(&doc)?;
        if record.owner != *owner {
            debug!(object_id = %id, %state, "object belongs to another owner");
            return Ok(None);
        }
        Ok(Some(StoredObject {
            id: id.clone(),
            record,
        }))
    }

    /// Snapshot of the owner's Active objects, newest first.
    pub async fn list_active(&self, owner: &OwnerId) -> DriveResult<Vec<StoredObject>> {
        self.list(ObjectState::Active, owner).await
    }

    /// Snapshot of the owner's Trashed objects, newest first.
    pub async fn list_trashed(&self, owner: &OwnerId) -> DriveResult<Vec<StoredObject>> {
        self.list(ObjectState::Trashed, owner).await
    }

    async fn list(&self, state: ObjectState, owner: &OwnerId) -> DriveResult<Vec<StoredObject>> {
        let docs = self
            .records
            .query(self.collection(state), &owner_filter(owner))
            .await?;
        Ok(decode_snapshot(&docs, state))
    }

    /// Live view of the owner's Active objects.
    pub async fn watch_active(&self, owner: &OwnerId) -> DriveResult<Listing> {
        self.watch(ObjectState::Active, owner).await
    }

    /// Live view of the owner's Trashed objects.
    pub async fn watch_trash(&self, owner: &OwnerId) -> DriveResult<Listing> {
        self.watch(ObjectState::Trashed, owner).await
    }

    async fn watch(&self, state: ObjectState, owner: &OwnerId) -> DriveResult<Listing> {
        let subscription = self
            .records
            .subscribe(self.collection(state), owner_filter(owner))
            .await?;
        Ok(Listing::new(subscription, state))
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Moves an Active object to the trash. Returns the Trashed copy.
    ///
    /// A Trashed copy with the same original identity is never duplicated.
    /// It is reused as is when its fields match the Active record, and
    /// overwritten with the Active fields otherwise.
    pub async fn move_to_trash(
        &self,
        owner: &OwnerId,
        id: &ObjectId,
    ) -> DriveResult<StoredObject> {
        let active = match self.find(ObjectState::Active, owner, id).await? {
            Some(active) => active,
            None => {
                return match self.find_trashed_copy(owner, id).await? {
                    Some(trashed) => {
                        debug!(object_id = %id, trashed_id = %trashed.id, "already trashed");
                        Ok(trashed)
                    }
                    None => Err(DriveError::NotFound(format!("active object {id}"))),
                };
            }
        };

        let original = active
            .record
            .original_identity
            .clone()
            .unwrap_or_else(|| id.clone());

        let mut record = active.record;
        record.original_identity = Some(original.clone());
        record.deleted_at = Some(Timestamp::now());

        let collection = self.collection(ObjectState::Trashed);
        let trashed = match self.find_trashed_copy(owner, &original).await? {
            Some(existing) if same_apart_from_deletion(&existing.record, &record) => {
                info!(object_id = %id, trashed_id = %existing.id, "reusing trashed copy from an earlier attempt");
                existing
            }
            Some(existing) => {
                warn!(object_id = %id, trashed_id = %existing.id, "stale trashed copy, overwriting with current fields");
                self.records
                    .set(
                        collection,
                        existing.id.as_str(),
                        record.to_document()?,
                        SetMode::Overwrite,
                    )
                    .await?;
                StoredObject {
                    id: existing.id,
                    record,
                }
            }
            None => {
                let trashed_id = self.records.create(collection, record.to_document()?).await?;
                StoredObject {
                    id: parse_store_id(&trashed_id)?,
                    record,
                }
            }
        };

        self.records
            .delete(self.collection(ObjectState::Active), id.as_str())
            .await
            .inspect_err(|e| {
                warn!(object_id = %id, trashed_id = %trashed.id, error = %e, "trashed copy created but active record not deleted");
            })?;

        info!(object_id = %id, trashed_id = %trashed.id, owner = %owner, "object moved to trash");
        Ok(trashed)
    }

    async fn find_trashed_copy(
        &self,
        owner: &OwnerId,
        original: &ObjectId,
    ) -> DriveResult<Option<StoredObject>> {
        let filter = owner_filter(owner).and_eq("originalIdentity", original.as_str());
        let docs = self
            .records
            .query(self.collection(ObjectState::Trashed), &filter)
            .await?;
        Ok(decode_snapshot(&docs, ObjectState::Trashed).into_iter().next())
    }

    /// Restores a Trashed object. Returns the Active record.
    ///
    /// With an original identity the Active record is fully overwritten at
    /// that id; otherwise a new id is minted. Encryption parameters, path, and
    /// unknown fields are carried over verbatim.
    pub async fn restore(&self, owner: &OwnerId, id: &ObjectId) -> DriveResult<StoredObject> {
        let trashed = self.get_trashed(owner, id).await?;

        let mut record = trashed.record;
        let target = record.original_identity.take();
        record.deleted_at = None;
        let doc = record.to_document()?;

        let active_collection = self.collection(ObjectState::Active);
        let active_id = match target {
            Some(original) => {
                self.records
                    .set(active_collection, original.as_str(), doc, SetMode::Overwrite)
                    .await?;
                original
            }
            None => {
                let minted = self.records.create(active_collection, doc).await?;
                let minted = parse_store_id(&minted)?;
                info!(trashed_id = %id, object_id = %minted, "no original identity, restored under a new id");
                minted
            }
        };

        self.records
            .delete(self.collection(ObjectState::Trashed), id.as_str())
            .await
            .inspect_err(|e| {
                warn!(object_id = %active_id, trashed_id = %id, error = %e, "restored but trashed copy not deleted");
            })?;

        info!(object_id = %active_id, trashed_id = %id, owner = %owner, "object restored");
        Ok(StoredObject {
            id: active_id,
            record,
        })
    }

    /// Permanently deletes a Trashed object and its blob.
    ///
    /// Purging an object that is already gone is a no-op. If the blob cannot
    /// be deleted the record is kept so the object stays visible.
    pub async fn purge(&self, owner: &OwnerId, id: &ObjectId) -> DriveResult<()> {
        let Some(trashed) = self.find(ObjectState::Trashed, owner, id).await? else {
            debug!(trashed_id = %id, "purge: already gone");
            return Ok(());
        };
        let path = &trashed.record.path;

        let still_active = self
            .records
            .query(
                self.collection(ObjectState::Active),
                &owner_filter(owner).and_eq("path", path.as_str()),
            )
            .await?;
        if let Some(active) = still_active.first() {
            warn!(trashed_id = %id, object_id = %active.id, path = %path, "purge refused: blob still referenced by an active record");
            return Err(DriveError::Integrity(format!(
                "blob {path} is still referenced by active object {}",
                active.id
            )));
        }

        match self.blobs.delete(path).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(trashed_id = %id, path = %path, "purge: blob already absent");
            }
            Err(e) => {
                warn!(trashed_id = %id, path = %path, error = %e, "purge: blob delete failed, keeping record");
                return Err(e.into());
            }
        }

        self.records
            .delete(self.collection(ObjectState::Trashed), id.as_str())
            .await?;
        info!(trashed_id = %id, owner = %owner, path = %path, "object purged");
        Ok(())
    }

    // ── Star ─────────────────────────────────────────────────────

    /// Sets the starred flag on an Active object.
    pub async fn set_starred(
        &self,
        owner: &OwnerId,
        id: &ObjectId,
        starred: bool,
    ) -> DriveResult<()> {
        let object = self.get_active(owner, id).await?;
        if object.record.starred == starred {
            return Ok(());
        }
        let mut patch = Document::new();
        patch.insert("starred".to_string(), starred.into());
        self.records
            .set(
                self.collection(ObjectState::Active),
                id.as_str(),
                patch,
                SetMode::Merge,
            )
            .await?;
        debug!(object_id = %id, starred, "star updated");
        Ok(())
    }

    /// Flips the starred flag. Returns the new value.
    pub async fn toggle_starred(&self, owner: &OwnerId, id: &ObjectId) -> DriveResult<bool> {
        let object = self.get_active(owner, id).await?;
        let starred = !object.record.starred;
        self.set_starred(owner, id, starred).await?;
        Ok(starred)
    }

    // ── Integrity ────────────────────────────────────────────────

    /// Scans the owner's records for consistency anomalies.
    pub async fn check_integrity(&self, owner: &OwnerId) -> DriveResult<IntegrityReport> {
        let filter = owner_filter(owner);
        let active = self
            .records
            .query(self.collection(ObjectState::Active), &filter)
            .await?;
        let trashed = self
            .records
            .query(self.collection(ObjectState::Trashed), &filter)
            .await?;
        Ok(integrity::check(&active, &trashed))
    }
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn validate_request(request: &UploadRequest) -> DriveResult<()> {
    if request.filename.trim().is_empty() {
        return Err(DriveError::Input("no file selected".to_string()));
    }
    Ok(())
}

fn owner_filter(owner: &OwnerId) -> Filter {
    Filter::eq("owner", owner.as_str())
}

/// Equal once the deletion timestamps are ignored.
fn same_apart_from_deletion(trashed: &ObjectRecord, current: &ObjectRecord) -> bool {
    let mut trashed = trashed.clone();
    trashed.deleted_at = current.deleted_at;
    trashed == *current
}

fn parse_store_id(id: &str) -> DriveResult<ObjectId> {
    ObjectId::parse(id)
        .map_err(|e| DriveError::Integrity(format!("record store returned bad id {id:?}: {e}")))
}

/// Runs a codec call on the blocking pool; key derivation is CPU-bound.
async fn run_codec<T, F>(f: F) -> DriveResult<T>
where
    F: FnOnce() -> CryptoResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(DriveError::from),
        Err(e) => Err(DriveError::Task(e.to_string())),
    }
}

async fn decrypt_blocking(
    ciphertext: Vec<u8>,
    passphrase: Passphrase,
    params: EncryptionParameters,
) -> DriveResult<Vec<u8>> {
    run_codec(move || sealdrive_crypto::decrypt(&ciphertext, &passphrase, &params)).await
}
