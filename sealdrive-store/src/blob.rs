//! Blob store abstraction.

use crate::error::StoreResult;
use async_trait::async_trait;

/// Durable path-addressed byte storage.
///
/// Paths are `/`-separated and opaque to the store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` at `path`, replacing any existing blob. Returns the path.
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String>;

    /// Reads the blob at `path`. Fails with `NotFound` if absent.
    async fn get(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Deletes the blob at `path`. An absent blob is not an error.
    async fn delete(&self, path: &str) -> StoreResult<()>;
}
