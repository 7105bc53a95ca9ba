//! Object Store Abstraction
//!
//! Audio attachments live in an object store (S3 in production, the local
//! filesystem on desktop). The catalog only needs three capabilities from it:
//! store an object under a key, delete an object by key, and check whether a
//! key exists.
//!
//! ## Keys and URLs
//!
//! Keys are slash-separated relative paths such as `songs/1700000000000-ab12cd34ef56.mp3`.
//! Implementations return a public URL whose path component is exactly `/{key}`,
//! which is what lets the catalog recover the key from a stored URL when a
//! song is deleted.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// Public URL of the object
    pub url: String,
    /// Object key inside the bucket/root
    pub key: String,
    /// Bucket or root name the object was written to
    pub bucket: String,
    /// Size in bytes
    pub size: u64,
}

/// Object store trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::object_store::ObjectStore;
///
/// async fn replace(store: &dyn ObjectStore, old_key: &str, data: Bytes) -> Result<()> {
///     store.put_object("songs/new.mp3", data, "audio/mpeg").await?;
///     store.delete_object(old_key).await
/// }
/// ```
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, overwriting any existing object
    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> Result<StoredObject>;

    /// Delete the object stored under `key`
    ///
    /// Deleting a key that does not exist is not an error.
    async fn delete_object(&self, key: &str) -> Result<()>;

    /// Check whether an object exists under `key`
    async fn object_exists(&self, key: &str) -> Result<bool>;
}
