pub mod s3;
pub mod upload;

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use thiserror::Error;

pub use s3::S3Storage;
pub use upload::{UploadPolicy, UploadRejection};

#[derive(Debug, Error)]
pub enum StorageError {
    /// URL does not start with the configured public base URL
    #[error("URL is outside the configured bucket: {0}")]
    ForeignUrl(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Object store request failed: {0}")]
    Upstream(String),

    #[error("Object storage is not configured")]
    NotConfigured,
}

/// Minimal object store surface: write a key, delete a key.
/// Public URLs are derived from `public_base_url`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn public_base_url(&self) -> &str;

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// `<base>/<key>` with exactly one slash between them
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

/// Reverse of [`public_url`]. Anything not under `base` is refused rather
/// than guessed at, so a stray URL can never delete an unrelated object.
pub fn key_from_url(base: &str, url: &str) -> Result<String, StorageError> {
    let prefix = format!("{}/", base.trim_end_matches('/'));
    let key = url
        .strip_prefix(&prefix)
        .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;

    if key.is_empty() {
        return Err(StorageError::InvalidKey("URL does not name an object".into()));
    }
    if key.split('/').any(|segment| segment.is_empty() || segment == "..") {
        return Err(StorageError::InvalidKey(format!("Malformed object key '{}'", key)));
    }
    Ok(key.to_string())
}

/// In-process object store used by tests and local runs without a bucket
pub struct MemoryStorage {
    base_url: String,
    objects: RwLock<HashMap<String, (Bytes, String)>>,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.read().get(key).map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStorage {
    fn public_base_url(&self) -> &str {
        &self.base_url
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.objects
            .write()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        // S3 DeleteObject succeeds for missing keys; mirror that
        self.objects.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://bucket.example.com";

    #[test]
    fn key_round_trips_through_url() {
        let url = public_url(BASE, "uploads/1_abc_me.png");
        assert_eq!(url, "https://bucket.example.com/uploads/1_abc_me.png");
        assert_eq!(key_from_url(BASE, &url).unwrap(), "uploads/1_abc_me.png");
        assert_eq!(key_from_url("https://bucket.example.com/", &url).unwrap(), "uploads/1_abc_me.png");
    }

    #[test]
    fn foreign_urls_are_refused() {
        assert!(matches!(
            key_from_url(BASE, "https://evil.example.com/uploads/x.png"),
            Err(StorageError::ForeignUrl(_))
        ));
        // Prefix must end on a path boundary
        assert!(matches!(
            key_from_url(BASE, "https://bucket.example.com.evil.net/x.png"),
            Err(StorageError::ForeignUrl(_))
        ));
    }

    #[test]
    fn empty_or_traversing_keys_are_refused() {
        assert!(matches!(key_from_url(BASE, "https://bucket.example.com/"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(
            key_from_url(BASE, "https://bucket.example.com/uploads/../secret"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
