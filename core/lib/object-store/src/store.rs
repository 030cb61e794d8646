use std::sync::Arc;

use bytes::Bytes;
use object_store::{path::Path, ObjectStore as RawObjectStore};

#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("key {key} not found")]
    NotFound { key: String },
    #[error("object store operation failed: {0}")]
    Backend(#[from] object_store::Error),
}

/// A key within a bucket-scoped object store, e.g.
/// `"{filenameRoot}/{startTs.unix()}-{i:05d}.zip"` (§4.5) or
/// `"{filenameRoot}/index.txt"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobKey(pub String);

impl BlobKey {
    fn as_path(&self) -> Path {
        Path::from(self.0.as_str())
    }
}

/// One bucket's worth of blob operations, backed by any `object_store`
/// implementation (GCS/S3/local filesystem/in-memory). Construction of the
/// concrete backend is left to the binary entrypoints — this type only
/// wraps an already-built `Arc<dyn ObjectStore>`.
#[derive(Clone)]
pub struct BucketStore {
    inner: Arc<dyn RawObjectStore>,
}

impl BucketStore {
    pub fn new(inner: Arc<dyn RawObjectStore>) -> Self {
        Self { inner }
    }

    /// An ephemeral in-memory store, for tests and for a single-process
    /// demo deployment that has no durable object storage configured.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(object_store::memory::InMemory::new()))
    }

    /// A durable store rooted at a local directory. The directory is
    /// created if it does not already exist.
    pub fn local(root: &std::path::Path) -> Result<Self, ObjectStoreError> {
        std::fs::create_dir_all(root).map_err(|e| ObjectStoreError::Backend(object_store::Error::Generic {
            store: "LocalFileSystem",
            source: Box::new(e),
        }))?;
        let fs = object_store::local::LocalFileSystem::new_with_prefix(root)?;
        Ok(Self::new(Arc::new(fs)))
    }

    pub async fn put(&self, key: &BlobKey, bytes: Bytes) -> Result<(), ObjectStoreError> {
        self.inner.put(&key.as_path(), bytes.into()).await?;
        Ok(())
    }

    pub async fn get(&self, key: &BlobKey) -> Result<Bytes, ObjectStoreError> {
        match self.inner.get(&key.as_path()).await {
            Ok(result) => Ok(result.bytes().await?),
            Err(object_store::Error::NotFound { .. }) => Err(ObjectStoreError::NotFound {
                key: key.0.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, key: &BlobKey) -> Result<(), ObjectStoreError> {
        match self.inner.delete(&key.as_path()).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_through_in_memory_store() {
        let store = BucketStore::in_memory();
        let key = BlobKey("federation/index.txt".to_string());
        store.put(&key, Bytes::from_static(b"a.zip\nb.zip")).await.unwrap();
        let bytes = store.get(&key).await.unwrap();
        assert_eq!(&bytes[..], b"a.zip\nb.zip");
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let store = BucketStore::in_memory();
        let err = store
            .get(&BlobKey("missing.zip".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ObjectStoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_missing_key_is_a_no_op() {
        let store = BucketStore::in_memory();
        store.delete(&BlobKey("missing.zip".to_string())).await.unwrap();
    }
}
