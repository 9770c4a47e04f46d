//! Local-disk blob and record stores.
//!
//! Blobs are plain files under a root directory, addressed by their
//! `/`-separated path. Records live in a [`MemoryRecordStore`] that is
//! written through to one JSON file per collection.

use crate::blob::BlobStore;
use crate::document::{Document, Filter, SetMode, StoredDocument, validate_segment};
use crate::error::{StoreError, StoreResult};
use crate::memory::{Checkpoint, MemoryRecordStore};
use crate::record::RecordStore;
use crate::subscription::Subscription;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

// ── Blobs ────────────────────────────────────────────────────────

/// Blob store writing one file per blob.
///
/// The content type is accepted for interface compatibility and not stored.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Opens (creating if needed) a blob directory.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let mut full = self.root.clone();
        for segment in path.split('/') {
            validate_segment("path segment", segment)?;
            full.push(segment);
        }
        Ok(full)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut partial = target.clone().into_os_string();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        fs::write(&partial, &bytes).await?;
        fs::rename(&partial, &target).await?;

        debug!(path, size = bytes.len(), content_type, "blob written");
        Ok(path.to_string())
    }

    async fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        let target = self.resolve(path)?;
        match fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(path.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => {
                debug!(path, "blob deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path, "blob delete: already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ── Records ──────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct CollectionFile {
    documents: Vec<StoredDocument>,
}

/// Record store persisted as `<dir>/<collection>.json`.
///
/// Every mutation rewrites the affected collection file. A write whose file
/// could not be saved is undone in memory, so what queries see always
/// matches what the next `open` loads. Live queries are served from memory.
#[derive(Debug)]
pub struct FileRecordStore {
    dir: PathBuf,
    memory: MemoryRecordStore,
    write_lock: Mutex<()>,
}

impl FileRecordStore {
    /// Opens (creating if needed) a record directory and loads every
    /// collection file in it.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        let memory = MemoryRecordStore::new();
        let mut read_dir = fs::read_dir(&dir).await?;
        let mut loaded = 0usize;

        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(collection) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_segment("collection", collection).is_err() {
                warn!(file = ?path, "skipping record file with invalid collection name");
                continue;
            }

            let bytes = fs::read(&path).await?;
            let file: CollectionFile = serde_json::from_slice(&bytes)?;
            loaded += file.documents.len();
            memory.import(
                collection,
                file.documents.into_iter().map(|d| (d.id, d.doc)).collect(),
            );
        }

        info!(dir = ?dir, documents = loaded, "record store opened");
        Ok(Self {
            dir,
            memory,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn persist(&self, collection: &str) -> StoreResult<()> {
        let file = CollectionFile {
            documents: self
                .memory
                .export(collection)
                .into_iter()
                .map(|(id, doc)| StoredDocument { id, doc })
                .collect(),
        };
        let target = self.dir.join(format!("{collection}.json"));
        let partial = self.dir.join(format!("{collection}.json.part"));

        fs::write(&partial, serde_json::to_vec_pretty(&file)?).await?;
        fs::rename(&partial, &target).await?;
        debug!(collection, documents = file.documents.len(), "collection persisted");
        Ok(())
    }

    /// Persists `collection`, undoing the in-memory write on failure.
    async fn commit<T>(
        &self,
        checkpoint: Checkpoint,
        collection: &str,
        value: T,
    ) -> StoreResult<T> {
        match self.persist(collection).await {
            Ok(()) => Ok(value),
            Err(e) => {
                warn!(collection, error = %e, "collection not persisted, write rolled back");
                self.memory.rollback(checkpoint);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn create(&self, collection: &str, doc: Document) -> StoreResult<String> {
        let _guard = self.write_lock.lock().await;
        let checkpoint = self.memory.checkpoint(collection);
        let id = self.memory.create_sync(collection, doc)?;
        self.commit(checkpoint, collection, id).await
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        mode: SetMode,
    ) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let checkpoint = self.memory.checkpoint(collection);
        self.memory.set_sync(collection, id, doc, mode)?;
        self.commit(checkpoint, collection, ()).await
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.memory.get(collection, id).await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let checkpoint = self.memory.checkpoint(collection);
        if self.memory.delete_sync(collection, id) {
            self.commit(checkpoint, collection, ()).await?;
        }
        Ok(())
    }

    async fn query(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>> {
        self.memory.query(collection, filter).await
    }

    async fn subscribe(&self, collection: &str, filter: Filter) -> StoreResult<Subscription> {
        self.memory.subscribe(collection, filter).await
    }
}
