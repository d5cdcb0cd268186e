//! Blob store gateway contract.
//!
//! Only used to read small configuration objects such as the banned-word
//! list.

use async_trait::async_trait;

use crate::error::StoreError;

/// Read access to the hosted blob storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Download the object at `path`.
    ///
    /// Fails with [`StoreError::ObjectTooLarge`] when the object exceeds
    /// `max_size_bytes` and [`StoreError::NotFound`] when it does not exist.
    async fn fetch(&self, path: &str, max_size_bytes: usize) -> Result<Vec<u8>, StoreError>;
}
