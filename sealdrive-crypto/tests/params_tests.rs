use sealdrive_crypto::{
    Algorithm, CryptoError, CryptoMetadata, EncryptionParameters, IV_SIZE, Iv, Kdf, SALT_SIZE,
    Salt,
};
use serde_json::json;

fn sample_params() -> EncryptionParameters {
    EncryptionParameters::new(
        250_000,
        Salt::from_bytes([1u8; SALT_SIZE]),
        Iv::from_bytes([2u8; IV_SIZE]),
    )
}

fn incomplete_reason(meta: &CryptoMetadata) -> String {
    match meta.validate() {
        Err(CryptoError::MetadataIncomplete(reason)) => reason,
        other => panic!("expected MetadataIncomplete, got {other:?}"),
    }
}

// ── identifiers ──────────────────────────────────────────────────

#[test]
fn identifiers_use_wire_names() {
    assert_eq!(Algorithm::AesGcm.as_str(), "AES-GCM");
    assert_eq!(Kdf::Pbkdf2Sha256.as_str(), "PBKDF2-SHA256");
    assert_eq!(Algorithm::parse("AES-GCM"), Some(Algorithm::AesGcm));
    assert_eq!(Kdf::parse("PBKDF2-SHA256"), Some(Kdf::Pbkdf2Sha256));
    assert_eq!(Algorithm::parse("ChaCha20"), None);
    assert_eq!(Kdf::parse("argon2id"), None);
}

// ── wire format ──────────────────────────────────────────────────

#[test]
fn metadata_serializes_to_wire_shape() {
    let meta = sample_params().to_metadata();
    let value = serde_json::to_value(&meta).unwrap();
    assert_eq!(
        value,
        json!({
            "alg": "AES-GCM",
            "kdf": "PBKDF2-SHA256",
            "iters": 250000,
            "salt_b64": "AQEBAQEBAQEBAQEBAQEBAQ==",
            "iv_b64": "AgICAgICAgICAgIC",
        })
    );
}

#[test]
fn metadata_validates_back_to_same_params() {
    let params = sample_params();
    let meta = CryptoMetadata::from(&params);
    assert_eq!(meta.validate().unwrap(), params);
    assert_eq!(EncryptionParameters::try_from(&meta).unwrap(), params);
    assert!(meta.is_complete());
}

#[test]
fn metadata_deserializes_with_missing_fields() {
    let meta: CryptoMetadata = serde_json::from_value(json!({ "alg": "AES-GCM" })).unwrap();
    assert_eq!(meta.alg.as_deref(), Some("AES-GCM"));
    assert!(meta.iters.is_none());
    assert!(!meta.is_complete());
}

#[test]
fn metadata_base64_whitespace_is_trimmed() {
    let mut meta = sample_params().to_metadata();
    meta.salt_b64 = meta.salt_b64.map(|s| format!(" {s}\n"));
    meta.iv_b64 = meta.iv_b64.map(|s| format!("\t{s} "));
    assert_eq!(meta.validate().unwrap(), sample_params());
}

// ── incomplete metadata ──────────────────────────────────────────

#[test]
fn missing_iterations_is_never_defaulted() {
    let mut meta = sample_params().to_metadata();
    meta.iters = None;
    let reason = incomplete_reason(&meta);
    assert!(reason.contains("iters missing"));
}

#[test]
fn zero_iterations_rejected() {
    let mut meta = sample_params().to_metadata();
    meta.iters = Some(0);
    assert!(incomplete_reason(&meta).contains("iters"));
}

#[test]
fn missing_salt_rejected() {
    let mut meta = sample_params().to_metadata();
    meta.salt_b64 = None;
    assert!(incomplete_reason(&meta).contains("salt_b64 missing"));
}

#[test]
fn blank_iv_rejected() {
    let mut meta = sample_params().to_metadata();
    meta.iv_b64 = Some("   ".into());
    assert!(incomplete_reason(&meta).contains("iv_b64 missing"));
}

#[test]
fn malformed_salt_rejected() {
    let mut meta = sample_params().to_metadata();
    meta.salt_b64 = Some("%%%".into());
    assert!(incomplete_reason(&meta).contains("salt_b64 malformed"));
}

#[test]
fn wrong_length_iv_rejected() {
    let mut meta = sample_params().to_metadata();
    meta.iv_b64 = Some(Salt::from_bytes([0u8; SALT_SIZE]).to_base64());
    assert!(incomplete_reason(&meta).contains("iv_b64 malformed"));
}

#[test]
fn unknown_algorithm_rejected() {
    let mut meta = sample_params().to_metadata();
    meta.alg = Some("AES-CBC".into());
    assert!(incomplete_reason(&meta).contains("alg unsupported: AES-CBC"));
}

#[test]
fn unknown_kdf_rejected() {
    let mut meta = sample_params().to_metadata();
    meta.kdf = Some("scrypt".into());
    assert!(incomplete_reason(&meta).contains("kdf unsupported: scrypt"));
}

#[test]
fn all_defects_are_reported_together() {
    let reason = incomplete_reason(&CryptoMetadata::default());
    for field in ["alg", "kdf", "iters", "salt_b64", "iv_b64"] {
        assert!(reason.contains(field), "{field} not reported in {reason}");
    }
}
