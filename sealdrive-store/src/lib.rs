//! Storage collaborators for sealdrive.
//!
//! Two interfaces sit under the lifecycle manager:
//! - [`BlobStore`]: path-addressed opaque bytes (ciphertext or plain uploads)
//! - [`RecordStore`]: JSON documents in named collections, with equality
//!   queries and live [`Subscription`]s
//!
//! [`MemoryBlobStore`] / [`MemoryRecordStore`] keep everything in process.
//! [`LocalBlobStore`] / [`FileRecordStore`] persist to a local directory.

mod blob;
mod document;
mod error;
mod local;
mod memory;
mod record;
mod subscription;

pub use blob::BlobStore;
pub use document::{Document, Filter, SetMode, StoredDocument, strip_absent};
pub use error::{StoreError, StoreResult};
pub use local::{FileRecordStore, LocalBlobStore};
pub use memory::{MemoryBlobStore, MemoryRecordStore};
pub use record::RecordStore;
pub use subscription::{Snapshot, Subscription};
