//! Stored object record schema.
//!
//! Records are persisted as camelCase JSON documents. Field names from the
//! first generation of the application (`userId`, `timestamp`, `originalId`,
//! `originalType`, `originalSize`, `size`, `contentType`) are accepted on
//! read. Fields this version does not know are kept in [`ObjectRecord::extra`]
//! and written back unchanged.

use crate::config::DriveConfig;
use crate::error::{DriveError, DriveResult};
use sealdrive_crypto::{CryptoError, CryptoMetadata, EncryptionParameters};
use sealdrive_store::{Document, StoredDocument, strip_absent};
use sealdrive_types::{ObjectId, OwnerId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Current record schema version.
pub const SCHEMA_VERSION: u32 = 1;

fn schema_v1() -> u32 {
    SCHEMA_VERSION
}

/// Lifecycle state, determined by the collection a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectState {
    Active,
    Trashed,
}

impl ObjectState {
    /// Collection holding records in this state.
    pub fn collection<'a>(&self, config: &'a DriveConfig) -> &'a str {
        match self {
            Self::Active => &config.active_collection,
            Self::Trashed => &config.trash_collection,
        }
    }
}

impl std::fmt::Display for ObjectState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Trashed => f.write_str("trashed"),
        }
    }
}

/// Metadata record for one stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    #[serde(default = "schema_v1")]
    pub schema_version: u32,

    /// Owner; every query and mutation is scoped to it.
    #[serde(alias = "userId")]
    pub owner: OwnerId,

    pub filename: String,

    /// Blob store address of the stored bytes.
    pub path: String,

    #[serde(default, alias = "originalType")]
    pub content_type_original: String,

    #[serde(default, alias = "contentType")]
    pub content_type_stored: String,

    #[serde(default, alias = "originalSize")]
    pub size_original: u64,

    #[serde(default, alias = "size")]
    pub size_stored: u64,

    #[serde(default)]
    pub is_encrypted: bool,

    /// Required and complete whenever `is_encrypted` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crypto: Option<CryptoMetadata>,

    #[serde(alias = "timestamp", deserialize_with = "de_timestamp")]
    pub created_at: Timestamp,

    /// Set only while Trashed.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_opt_timestamp"
    )]
    pub deleted_at: Option<Timestamp>,

    #[serde(default)]
    pub starred: bool,

    /// Active identity this record had before it was trashed. Set only while
    /// Trashed and never altered once set.
    #[serde(default, alias = "originalId", skip_serializing_if = "Option::is_none")]
    pub original_identity: Option<ObjectId>,

    /// Unknown fields, preserved but not interpreted.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ObjectRecord {
    /// Validated encryption parameters, or `None` for a plain object.
    ///
    /// An encrypted record without a complete crypto block is a
    /// [`CryptoError::MetadataIncomplete`], never a fallback to defaults.
    pub fn encryption_parameters(&self) -> Result<Option<EncryptionParameters>, CryptoError> {
        if !self.is_encrypted {
            return Ok(None);
        }
        match &self.crypto {
            Some(meta) => meta.validate().map(Some),
            None => Err(CryptoError::MetadataIncomplete(
                "crypto block missing".to_string(),
            )),
        }
    }

    /// Serializes for the record store, dropping absent values.
    pub fn to_document(&self) -> DriveResult<Document> {
        let value = serde_json::to_value(self)
            .map_err(|e| DriveError::Integrity(format!("record not serializable: {e}")))?;
        match value {
            Value::Object(mut doc) => {
                strip_absent(&mut doc);
                Ok(doc)
            }
            other => Err(DriveError::Integrity(format!(
                "record serialized to non-object: {other}"
            ))),
        }
    }

    /// Decodes a record store document.
    pub fn from_document(doc: &Document) -> DriveResult<Self> {
        serde_json::from_value(Value::Object(doc.clone()))
            .map_err(|e| DriveError::Integrity(format!("undecodable record: {e}")))
    }
}

/// A record together with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub id: ObjectId,
    pub record: ObjectRecord,
}

impl StoredObject {
    /// Decodes a document returned by a record store.
    pub fn from_stored(stored: &StoredDocument) -> DriveResult<Self> {
        let id = ObjectId::parse(&stored.id)
            .map_err(|e| DriveError::Integrity(format!("bad record id {:?}: {e}", stored.id)))?;
        Ok(Self {
            id,
            record: ObjectRecord::from_document(&stored.doc)?,
        })
    }
}

// ── Timestamps ───────────────────────────────────────────────────

/// Milliseconds, or a `{ seconds, nanoseconds }` object as written by the
/// hosted record store the first generation used.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Millis(i64),
    Parts {
        seconds: i64,
        #[serde(default)]
        nanoseconds: i64,
    },
}

impl WireTimestamp {
    fn into_timestamp<E: serde::de::Error>(self) -> Result<Timestamp, E> {
        match self {
            Self::Millis(ms) => Ok(Timestamp::from_millis(ms)),
            Self::Parts {
                seconds,
                nanoseconds,
            } => seconds
                .checked_mul(1_000)
                .and_then(|ms| ms.checked_add(nanoseconds / 1_000_000))
                .map(Timestamp::from_millis)
                .ok_or_else(|| E::custom("timestamp out of range")),
        }
    }
}

fn de_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    WireTimestamp::deserialize(deserializer)?.into_timestamp()
}

fn de_opt_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Timestamp>, D::Error> {
    Option::<WireTimestamp>::deserialize(deserializer)?
        .map(WireTimestamp::into_timestamp)
        .transpose()
}
