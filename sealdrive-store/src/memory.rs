//! In-process blob and record stores.
//!
//! Used directly in tests and as the working set behind
//! [`FileRecordStore`](crate::FileRecordStore).

use crate::blob::BlobStore;
use crate::document::{
    Document, Filter, SetMode, StoredDocument, ensure_no_absent, validate_segment,
};
use crate::error::{StoreError, StoreResult};
use crate::record::RecordStore;
use crate::subscription::{Snapshot, Subscription};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::{RwLock, watch};
use tracing::debug;

// ── Blobs ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    content_type: String,
}

/// Blob store backed by a hash map.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, StoredBlob>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type recorded by the last `put` at `path`.
    pub async fn content_type(&self, path: &str) -> Option<String> {
        self.blobs
            .read()
            .await
            .get(path)
            .map(|b| b.content_type.clone())
    }

    /// Whether a blob exists at `path`.
    pub async fn contains(&self, path: &str) -> bool {
        self.blobs.read().await.contains_key(path)
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        for segment in path.split('/') {
            validate_segment("path segment", segment)?;
        }
        debug!(path, size = bytes.len(), "memory blob put");
        self.blobs.write().await.insert(
            path.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(path.to_string())
    }

    async fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(path)
            .map(|b| b.bytes.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        if self.blobs.write().await.remove(path).is_none() {
            debug!(path, "memory blob delete: already absent");
        }
        Ok(())
    }
}

// ── Records ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    doc: Document,
}

/// Contents of one collection before a write.
pub(crate) struct Checkpoint {
    collection: String,
    entries: Option<HashMap<String, Entry>>,
}

struct Subscriber {
    id: u64,
    collection: String,
    filter: Filter,
    tx: watch::Sender<Snapshot>,
}

#[derive(Default)]
struct State {
    collections: HashMap<String, HashMap<String, Entry>>,
    subscribers: Vec<Subscriber>,
    next_seq: u64,
    next_subscriber: u64,
}

impl State {
    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn snapshot(&self, collection: &str, filter: &Filter) -> Snapshot {
        collect_snapshot(self.collections.get(collection), filter)
    }

    fn notify(&mut self, collection: &str) {
        self.subscribers.retain(|s| !s.tx.is_closed());
        let docs = self.collections.get(collection);
        for sub in self.subscribers.iter().filter(|s| s.collection == collection) {
            sub.tx.send_replace(collect_snapshot(docs, &sub.filter));
        }
    }
}

fn collect_snapshot(docs: Option<&HashMap<String, Entry>>, filter: &Filter) -> Snapshot {
    let Some(docs) = docs else {
        return Vec::new();
    };
    let mut matching: Vec<(&String, &Entry)> = docs
        .iter()
        .filter(|(_, entry)| filter.matches(&entry.doc))
        .collect();
    matching.sort_by(|a, b| b.1.seq.cmp(&a.1.seq));
    matching
        .into_iter()
        .map(|(id, entry)| StoredDocument {
            id: id.clone(),
            doc: entry.doc.clone(),
        })
        .collect()
}

/// Record store backed by hash maps, with live queries.
///
/// Snapshots are ordered newest first by creation order within the store.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    state: Arc<Mutex<State>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of open live queries.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|s| !s.tx.is_closed());
        state.subscribers.len()
    }

    /// Collection names currently holding at least one document.
    pub fn collections(&self) -> Vec<String> {
        let state = self.lock();
        let mut names: Vec<String> = state
            .collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Entries of one collection in creation order.
    pub(crate) fn export(&self, collection: &str) -> Vec<(String, Document)> {
        let state = self.lock();
        let Some(docs) = state.collections.get(collection) else {
            return Vec::new();
        };
        let mut entries: Vec<(&String, &Entry)> = docs.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.seq);
        entries
            .into_iter()
            .map(|(id, entry)| (id.clone(), entry.doc.clone()))
            .collect()
    }

    /// Loads entries in creation order, oldest first.
    pub(crate) fn import(&self, collection: &str, entries: Vec<(String, Document)>) {
        let mut state = self.lock();
        for (id, doc) in entries {
            let seq = state.bump_seq();
            state
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(id, Entry { seq, doc });
        }
        state.notify(collection);
    }

    pub(crate) fn create_sync(&self, collection: &str, doc: Document) -> StoreResult<String> {
        validate_segment("collection", collection)?;
        ensure_no_absent(&doc)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut state = self.lock();
        let seq = state.bump_seq();
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), Entry { seq, doc });
        state.notify(collection);
        debug!(collection, id = %id, "record created");
        Ok(id)
    }

    pub(crate) fn set_sync(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        mode: SetMode,
    ) -> StoreResult<()> {
        validate_segment("collection", collection)?;
        validate_segment("document id", id)?;
        ensure_no_absent(&doc)?;
        let mut state = self.lock();
        let fresh_seq = state.bump_seq();
        let docs = state.collections.entry(collection.to_string()).or_default();
        if let Some(existing) = docs.get_mut(id) {
            match mode {
                SetMode::Overwrite => existing.doc = doc,
                SetMode::Merge => existing.doc.extend(doc),
            }
        } else {
            docs.insert(
                id.to_string(),
                Entry {
                    seq: fresh_seq,
                    doc,
                },
            );
        }
        state.notify(collection);
        debug!(collection, id, ?mode, "record set");
        Ok(())
    }

    pub(crate) fn delete_sync(&self, collection: &str, id: &str) -> bool {
        let mut state = self.lock();
        let removed = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            state.notify(collection);
        } else {
            debug!(collection, id, "record delete: already absent");
        }
        removed
    }

    /// Captures one collection so a later write to it can be undone.
    pub(crate) fn checkpoint(&self, collection: &str) -> Checkpoint {
        let state = self.lock();
        Checkpoint {
            collection: collection.to_string(),
            entries: state.collections.get(collection).cloned(),
        }
    }

    /// Puts a collection back to its checkpointed contents.
    pub(crate) fn rollback(&self, checkpoint: Checkpoint) {
        let Checkpoint {
            collection,
            entries,
        } = checkpoint;
        let mut state = self.lock();
        match entries {
            Some(entries) => {
                state.collections.insert(collection.clone(), entries);
            }
            None => {
                state.collections.remove(&collection);
            }
        }
        state.notify(&collection);
        debug!(collection = %collection, "collection rolled back");
    }

    fn subscribe_sync(&self, collection: &str, filter: Filter) -> StoreResult<Subscription> {
        validate_segment("collection", collection)?;
        let mut state = self.lock();
        let (tx, rx) = watch::channel(state.snapshot(collection, &filter));
        state.next_subscriber += 1;
        let id = state.next_subscriber;
        state.subscribers.push(Subscriber {
            id,
            collection: collection.to_string(),
            filter,
            tx,
        });
        debug!(collection, subscriber = id, "subscription opened");

        let weak: Weak<Mutex<State>> = Arc::downgrade(&self.state);
        Ok(Subscription::new(rx, move || {
            if let Some(state) = weak.upgrade() {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                state.subscribers.retain(|s| s.id != id);
            }
        }))
    }
}

impl std::fmt::Debug for MemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MemoryRecordStore")
            .field("collections", &state.collections.len())
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, collection: &str, doc: Document) -> StoreResult<String> {
        self.create_sync(collection, doc)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        mode: SetMode,
    ) -> StoreResult<()> {
        self.set_sync(collection, id, doc, mode)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let state = self.lock();
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|entry| entry.doc.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.delete_sync(collection, id);
        Ok(())
    }

    async fn query(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>> {
        Ok(self.lock().snapshot(collection, filter))
    }

    async fn subscribe(&self, collection: &str, filter: Filter) -> StoreResult<Subscription> {
        self.subscribe_sync(collection, filter)
    }
}
