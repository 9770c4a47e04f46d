//! Upload requests and blob path allocation.

use sealdrive_types::Timestamp;

const MAX_NAME_LEN: usize = 100;

/// A file to upload.
#[derive(Clone)]
pub struct UploadRequest {
    pub filename: String,
    /// Content type reported by the source, e.g. `application/pdf`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Plaintext returned by a download.
#[derive(Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for DownloadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadedFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Reduces a filename to characters safe in a single path segment.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Allocates a blob path unique per upload: time, a random component, and
/// the sanitized name.
pub fn blob_path(prefix: &str, filename: &str, encrypted: bool, now: Timestamp) -> String {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let suffix = if encrypted { ".enc" } else { "" };
    format!(
        "{prefix}/{}_{}_{}{suffix}",
        now.as_millis(),
        &nonce[..8],
        sanitize_filename(filename)
    )
}
