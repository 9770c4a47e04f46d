//! Property tests for record encoding and path allocation.

use proptest::prelude::*;
use sealdrive_drive::{ObjectRecord, SCHEMA_VERSION, blob_path, sanitize_filename};
use sealdrive_types::{OwnerId, Timestamp};
use serde_json::Value;
use std::collections::BTreeMap;

fn extra_strategy() -> impl Strategy<Value = BTreeMap<String, Value>> {
    prop::collection::btree_map(
        "x_[a-z]{1,8}",
        prop_oneof![
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[ -~]{0,16}".prop_map(Value::from),
        ],
        0..4,
    )
}

proptest! {
    /// Sanitized names are a single safe path segment
    #[test]
    fn sanitized_names_are_safe_segments(name in any::<String>()) {
        let clean = sanitize_filename(&name);
        prop_assert!(!clean.is_empty());
        prop_assert!(!clean.starts_with('.'));
        prop_assert!(clean
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')));
    }

    /// Every segment of an allocated blob path is addressable
    #[test]
    fn blob_path_segments_are_valid(name in any::<String>(), millis in 0i64..4_102_444_800_000) {
        let path = blob_path("files", &name, true, Timestamp::from_millis(millis));
        for segment in path.split('/') {
            prop_assert!(!segment.is_empty());
            prop_assert!(segment != "." && segment != "..");
        }
        prop_assert_eq!(path.split('/').count(), 2);
    }

    /// Records survive the record store encoding, unknown fields included
    #[test]
    fn record_document_roundtrip(
        filename in "[ -~]{1,40}",
        size in any::<u32>(),
        starred in any::<bool>(),
        created in any::<i64>(),
        extra in extra_strategy(),
    ) {
        let record = ObjectRecord {
            schema_version: SCHEMA_VERSION,
            owner: OwnerId::parse("alice").unwrap(),
            filename,
            path: "files/1_x_a".to_string(),
            content_type_original: "text/plain".to_string(),
            content_type_stored: "text/plain".to_string(),
            size_original: u64::from(size),
            size_stored: u64::from(size),
            is_encrypted: false,
            crypto: None,
            created_at: Timestamp::from_millis(created),
            deleted_at: None,
            starred,
            original_identity: None,
            extra,
        };
        let decoded = ObjectRecord::from_document(&record.to_document().unwrap()).unwrap();
        prop_assert_eq!(decoded, record);
    }
}
