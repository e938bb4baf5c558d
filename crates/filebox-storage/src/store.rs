//! Object store port.

use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::StorageResult;

/// Streaming body of a stored object.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Bucketed object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Open a read stream for an object.
    ///
    /// Fails with [`StorageError::NotFound`](crate::StorageError::NotFound)
    /// when the key does not exist.
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectReader>;

    /// Upload `size` bytes read from `body`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ObjectReader,
        size: u64,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Check if an object exists.
    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;
}
