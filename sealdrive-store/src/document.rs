//! Documents, filters, and write modes shared by record stores.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record store document: a JSON object.
pub type Document = serde_json::Map<String, Value>;

/// A document together with its identity within a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub doc: Document,
}

/// How [`RecordStore::set`](crate::RecordStore::set) treats an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// Replace the whole document. No field of the previous version survives.
    Overwrite,
    /// Update the given fields and keep the others.
    Merge,
}

/// Equality filter over top-level document fields.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches documents whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    /// Adds another equality clause.
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }
}

/// Removes every top-level field holding the absent sentinel (`null`).
///
/// Returns the number of fields removed.
pub fn strip_absent(doc: &mut Document) -> usize {
    let before = doc.len();
    doc.retain(|_, v| !v.is_null());
    before - doc.len()
}

/// Rejects a document that still carries absent sentinels.
pub(crate) fn ensure_no_absent(doc: &Document) -> StoreResult<()> {
    let absent: Vec<&str> = doc
        .iter()
        .filter(|(_, v)| v.is_null())
        .map(|(k, _)| k.as_str())
        .collect();
    if absent.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Rejected(format!(
            "absent value in field(s): {}",
            absent.join(", ")
        )))
    }
}

/// Validates a collection name or a single path segment.
pub(crate) fn validate_segment(kind: &str, segment: &str) -> StoreResult<()> {
    let bad = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::Rejected(format!("invalid {kind}: {segment:?}")));
    }
    Ok(())
}
