//! Local-disk media store, served by the `/media` route

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{MediaError, MediaStore, validate_key};

pub struct LocalMediaStore {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, MediaError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), MediaError> {
        let path = self.path_for(key)?;
        if tokio::fs::try_exists(&path).await? {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // temp file + rename: readers never see a partial image
        let tmp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, MediaError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path(), "/media");
        store.put("9/abc.jpg", vec![1, 2, 3], "image/jpeg").await.unwrap();
        assert_eq!(store.get("9/abc.jpg").await.unwrap(), vec![1, 2, 3]);
        assert!(dir.path().join("9/abc.jpg").exists());
        assert_eq!(store.url("9/abc.jpg"), "/media/9/abc.jpg");
    }

    #[tokio::test]
    async fn duplicate_put_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path(), "/media");
        store.put("9/abc.jpg", vec![1], "image/jpeg").await.unwrap();
        store.put("9/abc.jpg", vec![1], "image/jpeg").await.unwrap();
        let entries = std::fs::read_dir(dir.path().join("9")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn missing_and_invalid_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path(), "/media");
        assert!(matches!(store.get("9/none.jpg").await, Err(MediaError::NotFound(_))));
        assert!(matches!(
            store.put("../escape.jpg", vec![1], "image/jpeg").await,
            Err(MediaError::InvalidKey(_))
        ));
    }
}
