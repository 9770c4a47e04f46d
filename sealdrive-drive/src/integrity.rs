//! Consistency checks over a user's records.
//!
//! Anomalies are reported, never repaired: deleting either side of a
//! duplicate could lose the only readable copy.

use crate::schema::{ObjectRecord, ObjectState};
use sealdrive_store::StoredDocument;
use sealdrive_types::ObjectId;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// One detected anomaly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityWarning {
    /// A Trashed record points at an identity that is still Active. The
    /// Active record is authoritative for display.
    DuplicateAcrossStates {
        active_id: ObjectId,
        trashed_id: ObjectId,
    },
    /// An encrypted record cannot yield encryption parameters.
    IncompleteCrypto {
        id: String,
        state: ObjectState,
        reason: String,
    },
    /// A document does not decode as a record.
    Undecodable {
        id: String,
        state: ObjectState,
        reason: String,
    },
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateAcrossStates {
                active_id,
                trashed_id,
            } => write!(
                f,
                "object {active_id} is active and also trashed as {trashed_id}"
            ),
            Self::IncompleteCrypto { id, state, reason } => {
                write!(f, "{state} object {id} has incomplete encryption metadata: {reason}")
            }
            Self::Undecodable { id, state, reason } => {
                write!(f, "{state} record {id} is undecodable: {reason}")
            }
        }
    }
}

/// Result of [`check`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub active: usize,
    pub trashed: usize,
    pub warnings: Vec<IntegrityWarning>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Checks Active and Trashed snapshots of one owner.
pub fn check(active: &[StoredDocument], trashed: &[StoredDocument]) -> IntegrityReport {
    let mut report = IntegrityReport {
        active: active.len(),
        trashed: trashed.len(),
        warnings: Vec::new(),
    };

    let active_records = decode_all(active, ObjectState::Active, &mut report.warnings);
    let trashed_records = decode_all(trashed, ObjectState::Trashed, &mut report.warnings);

    let active_ids: HashSet<&str> = active_records.iter().map(|(id, _)| *id).collect();
    for (trashed_id, record) in &trashed_records {
        let Some(original) = &record.original_identity else {
            continue;
        };
        if active_ids.contains(original.as_str()) {
            if let Ok(trashed_id) = ObjectId::parse(trashed_id) {
                report.warnings.push(IntegrityWarning::DuplicateAcrossStates {
                    active_id: original.clone(),
                    trashed_id,
                });
            }
        }
    }

    for warning in &report.warnings {
        warn!(%warning, "integrity anomaly");
    }
    report
}

fn decode_all<'a>(
    docs: &'a [StoredDocument],
    state: ObjectState,
    warnings: &mut Vec<IntegrityWarning>,
) -> Vec<(&'a str, ObjectRecord)> {
    let mut records = Vec::with_capacity(docs.len());
    for doc in docs {
        let record = match ObjectRecord::from_document(&doc.doc) {
            Ok(record) => record,
            Err(e) => {
                warnings.push(IntegrityWarning::Undecodable {
                    id: doc.id.clone(),
                    state,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if let Err(e) = record.encryption_parameters() {
            warnings.push(IntegrityWarning::IncompleteCrypto {
                id: doc.id.clone(),
                state,
                reason: e.to_string(),
            });
        }
        records.push((doc.id.as_str(), record));
    }
    records
}
