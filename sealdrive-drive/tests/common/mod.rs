//! Shared fixtures: fault-injecting store wrappers and prompts.

#![allow(dead_code)]

use async_trait::async_trait;
use sealdrive_crypto::Passphrase;
use sealdrive_drive::{
    DriveConfig, FixedPassphrase, LifecycleManager, PassphrasePrompt, PromptPurpose,
};
use sealdrive_store::{
    BlobStore, Document, Filter, MemoryBlobStore, MemoryRecordStore, RecordStore, SetMode,
    StoreError, StoreResult, StoredDocument, Subscription,
};
use sealdrive_types::OwnerId;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub type OpLog = Arc<Mutex<Vec<String>>>;

fn log(ops: &OpLog, entry: String) {
    ops.lock().unwrap().push(entry);
}

fn unavailable() -> StoreError {
    StoreError::Unavailable("injected fault".to_string())
}

// ── Blob store ──────────────────────────────────────────────────

#[derive(Default)]
pub struct FaultyBlobStore {
    pub inner: MemoryBlobStore,
    pub fail_get: AtomicBool,
    pub fail_delete: AtomicBool,
    pub ops: OpLog,
}

#[async_trait]
impl BlobStore for FaultyBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        log(&self.ops, format!("blob.put:{path}"));
        self.inner.put(path, bytes, content_type).await
    }

    async fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        log(&self.ops, format!("blob.get:{path}"));
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.get(path).await
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        log(&self.ops, format!("blob.delete:{path}"));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.delete(path).await
    }
}

// ── Record store ────────────────────────────────────────────────

/// Fails writes to the named collection while set.
#[derive(Default)]
pub struct FaultyRecordStore {
    pub inner: MemoryRecordStore,
    pub fail_create_in: Mutex<Option<String>>,
    pub fail_set_in: Mutex<Option<String>>,
    pub fail_delete_in: Mutex<Option<String>>,
    pub ops: OpLog,
}

impl FaultyRecordStore {
    fn failing(slot: &Mutex<Option<String>>, collection: &str) -> bool {
        slot.lock().unwrap().as_deref() == Some(collection)
    }

    pub fn heal(&self) {
        *self.fail_create_in.lock().unwrap() = None;
        *self.fail_set_in.lock().unwrap() = None;
        *self.fail_delete_in.lock().unwrap() = None;
    }
}

#[async_trait]
impl RecordStore for FaultyRecordStore {
    async fn create(&self, collection: &str, doc: Document) -> StoreResult<String> {
        log(&self.ops, format!("record.create:{collection}"));
        if Self::failing(&self.fail_create_in, collection) {
            return Err(unavailable());
        }
        self.inner.create(collection, doc).await
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        mode: SetMode,
    ) -> StoreResult<()> {
        log(&self.ops, format!("record.set:{collection}"));
        if Self::failing(&self.fail_set_in, collection) {
            return Err(unavailable());
        }
        self.inner.set(collection, id, doc, mode).await
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        log(&self.ops, format!("record.delete:{collection}"));
        if Self::failing(&self.fail_delete_in, collection) {
            return Err(unavailable());
        }
        self.inner.delete(collection, id).await
    }

    async fn query(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>> {
        self.inner.query(collection, filter).await
    }

    async fn subscribe(&self, collection: &str, filter: Filter) -> StoreResult<Subscription> {
        self.inner.subscribe(collection, filter).await
    }
}

// ── Prompts ─────────────────────────────────────────────────────

/// Always cancels.
pub struct CancelPrompt;

#[async_trait]
impl PassphrasePrompt for CancelPrompt {
    async fn request(&self, _purpose: PromptPurpose) -> Option<Passphrase> {
        None
    }
}

/// Answers with a fixed passphrase and counts requests.
pub struct CountingPrompt {
    inner: FixedPassphrase,
    pub count: AtomicUsize,
}

impl CountingPrompt {
    pub fn new(passphrase: &str) -> Self {
        Self {
            inner: fixed(passphrase),
            count: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PassphrasePrompt for CountingPrompt {
    async fn request(&self, purpose: PromptPurpose) -> Option<Passphrase> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.request(purpose).await
    }
}

pub fn fixed(passphrase: &str) -> FixedPassphrase {
    FixedPassphrase::new(Passphrase::new(passphrase).unwrap())
}

// ── Harness ─────────────────────────────────────────────────────

pub struct Harness {
    pub manager: LifecycleManager,
    pub blobs: Arc<FaultyBlobStore>,
    pub records: Arc<FaultyRecordStore>,
    pub ops: OpLog,
}

impl Harness {
    pub fn new() -> Self {
        let ops: OpLog = Arc::default();
        let blobs = Arc::new(FaultyBlobStore {
            ops: ops.clone(),
            ..Default::default()
        });
        let records = Arc::new(FaultyRecordStore {
            ops: ops.clone(),
            ..Default::default()
        });
        let manager =
            LifecycleManager::new(blobs.clone(), records.clone(), DriveConfig::default()).unwrap();
        Self {
            manager,
            blobs,
            records,
            ops,
        }
    }

    /// Operations recorded since the last call.
    pub fn take_ops(&self) -> Vec<String> {
        std::mem::take(&mut *self.ops.lock().unwrap())
    }

    pub async fn doc_count(&self, collection: &str) -> usize {
        self.records
            .inner
            .query(collection, &Filter::all())
            .await
            .unwrap()
            .len()
    }
}

pub fn alice() -> OwnerId {
    OwnerId::parse("alice").unwrap()
}

pub fn bob() -> OwnerId {
    OwnerId::parse("bob").unwrap()
}

pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}
