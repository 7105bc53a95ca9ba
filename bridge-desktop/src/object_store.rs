//! Object Store Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    object_store::{ObjectStore, StoredObject},
};
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Filesystem-backed object store
///
/// Objects are written below `root` using their key as a relative path, and
/// public URLs are `{public_base_url}/{key}`. Intended for local development
/// and tests; production deployments inject an S3-backed implementation.
pub struct LocalObjectStore {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl LocalObjectStore {
    /// Create a store rooted at the platform data directory
    pub fn new(public_base_url: impl Into<String>) -> Self {
        let root = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("song-catalog")
            .join("objects");

        Self::with_root(root, public_base_url)
    }

    /// Create a store rooted at a custom directory
    pub fn with_root(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let root = root.into();
        let bucket = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "objects".to_string());

        Self {
            root,
            bucket,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Root directory objects are written to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL an object stored under `key` is served from
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Resolve a key to a path below the root, rejecting keys that escape it
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_safe = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_safe {
            return Err(BridgeError::OperationFailed(format!(
                "Invalid object key: {}",
                key
            )));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> Result<StoredObject> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, &data).await?;
        info!(key, content_type, size = data.len(), "Stored object");

        Ok(StoredObject {
            url: self.url_for(key),
            key: key.to_string(),
            bucket: self.bucket.clone(),
            size: data.len() as u64,
        })
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "Deleted object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(key, "Object already absent");
                Ok(())
            }
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_store() -> LocalObjectStore {
        let root = env::temp_dir().join(format!("catalog-objects-{}", uuid::Uuid::new_v4()));
        LocalObjectStore::with_root(root, "http://localhost:3000/")
    }

    #[tokio::test]
    async fn test_put_and_delete_object() {
        let store = temp_store();
        let data = Bytes::from_static(b"ID3 fake mp3");

        let stored = store
            .put_object("songs/1-abc.mp3", data.clone(), "audio/mpeg")
            .await
            .unwrap();

        assert_eq!(stored.key, "songs/1-abc.mp3");
        assert_eq!(stored.url, "http://localhost:3000/songs/1-abc.mp3");
        assert_eq!(stored.size, data.len() as u64);
        assert!(store.object_exists("songs/1-abc.mp3").await.unwrap());

        store.delete_object("songs/1-abc.mp3").await.unwrap();
        assert!(!store.object_exists("songs/1-abc.mp3").await.unwrap());

        let _ = fs::remove_dir_all(store.root()).await;
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_ok() {
        let store = temp_store();
        assert!(store.delete_object("songs/missing.mp3").await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let store = temp_store();

        let result = store
            .put_object("../outside.mp3", Bytes::from_static(b"x"), "audio/mpeg")
            .await;
        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));

        let result = store.delete_object("/etc/passwd").await;
        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));

        let result = store.object_exists("").await;
        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));
    }

    #[test]
    fn test_bucket_name_from_root() {
        let store = LocalObjectStore::with_root("/tmp/catalog-bucket", "http://cdn");
        assert_eq!(store.bucket, "catalog-bucket");
        assert_eq!(store.url_for("songs/x.mp3"), "http://cdn/songs/x.mp3");
    }
}
