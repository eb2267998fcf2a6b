//! Media storage for uploaded photos
//!
//! Uploads are normalized to JPEG by [`processing`] and written under a
//! content-addressed key `{restaurant_id}/{sha256}.jpg`.

pub mod local;
pub mod processing;
pub mod s3;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};

pub use local::LocalMediaStore;
pub use processing::{ProcessedImage, image_key, process_upload};
pub use s3::S3MediaStore;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid media key: {0}")]
    InvalidKey(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::NotFound(key) => AppError::not_found("Media").with_detail("key", key),
            MediaError::InvalidKey(key) => AppError::invalid("Invalid media key").with_detail("key", key),
            other => AppError::with_message(ErrorCode::FileStorageFailed, other.to_string()),
        }
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `data` under `key`; storing the same key twice is harmless
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), MediaError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, MediaError>;

    /// Public base URL, without trailing slash
    fn base_url(&self) -> &str;

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url(), key)
    }

    /// Inverse of [`MediaStore::url`]
    fn key_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(self.base_url())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| validate_key(key).is_ok())
            .map(str::to_string)
    }
}

/// Where a processed upload ended up
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredImage {
    pub url: String,
    /// Hex SHA-256 of the stored JPEG
    pub hash: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Normalize an upload and write it under its content-addressed key
pub async fn store_image(
    store: &dyn MediaStore,
    restaurant_id: i64,
    data: &[u8],
    filename: Option<&str>,
    content_type: Option<&str>,
) -> Result<StoredImage, AppError> {
    let processed = process_upload(data, filename, content_type)?;
    let key = image_key(restaurant_id, &processed.hash);
    store.put(&key, processed.bytes.clone(), "image/jpeg").await?;

    tracing::info!(
        key = %key,
        size = processed.bytes.len(),
        width = processed.width,
        height = processed.height,
        "Image stored"
    );
    Ok(StoredImage {
        url: store.url(&key),
        hash: processed.hash,
        bytes: processed.bytes,
    })
}

/// Keys are relative `segment/segment` paths of `[A-Za-z0-9._-]`, never `..`
pub fn validate_key(key: &str) -> Result<(), MediaError> {
    let ok = !key.is_empty()
        && key.split('/').all(|seg| {
            !seg.is_empty()
                && seg != "."
                && seg != ".."
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        });
    if ok {
        Ok(())
    } else {
        Err(MediaError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_validation() {
        assert!(validate_key("42/abcdef.jpg").is_ok());
        for bad in ["", "/etc/passwd", "../x.jpg", "42/../x.jpg", "42//x.jpg", "42/x y.jpg"] {
            assert!(validate_key(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn url_round_trip() {
        let store = LocalMediaStore::new("/tmp/unused", "https://cdn.example.com/media/");
        let url = store.url("42/abc.jpg");
        assert_eq!(url, "https://cdn.example.com/media/42/abc.jpg");
        assert_eq!(store.key_from_url(&url).as_deref(), Some("42/abc.jpg"));
        assert_eq!(store.key_from_url("https://elsewhere.com/42/abc.jpg"), None);
        assert_eq!(store.key_from_url("https://cdn.example.com/media/../secret"), None);
    }

    #[test]
    fn storage_errors_map_to_app_codes() {
        let err: AppError = MediaError::Backend("boom".into()).into();
        assert_eq!(err.code, ErrorCode::FileStorageFailed);
        let err: AppError = MediaError::NotFound("1/a.jpg".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
