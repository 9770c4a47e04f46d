//! Record store abstraction.

use crate::document::{Document, Filter, SetMode, StoredDocument};
use crate::error::StoreResult;
use crate::subscription::Subscription;
use async_trait::async_trait;

/// Durable document storage grouped into named collections.
///
/// Writes containing a top-level `null` (the absent sentinel) are rejected
/// with `Rejected`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores a new document under a freshly minted id and returns the id.
    async fn create(&self, collection: &str, doc: Document) -> StoreResult<String>;

    /// Writes a document at a caller-chosen id, creating it if absent.
    async fn set(&self, collection: &str, id: &str, doc: Document, mode: SetMode)
    -> StoreResult<()>;

    /// Reads one document.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Deletes one document. An absent document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Returns the matching documents, newest first.
    async fn query(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>>;

    /// Opens a live query. The subscription holds the current snapshot
    /// immediately and is updated after every change to the collection.
    async fn subscribe(&self, collection: &str, filter: Filter) -> StoreResult<Subscription>;
}
