//! Object storage for customer attachments.
//!
//! Customer documents land in a MinIO-compatible store, one bucket per
//! company registry number. The `ObjectStorage` trait keeps the rest of the
//! system independent of the concrete client; `MemoryStorage` backs tests.

pub mod keys;
pub mod memory;
pub mod s3;

use async_trait::async_trait;
use thiserror::Error;

pub use keys::{prefixed_object_key, timestamped_object_key};
pub use memory::MemoryStorage;
pub use s3::S3Storage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage credentials error: {0}")]
    Credentials(String),

    #[error("bucket '{bucket}' error: {details}")]
    Bucket { bucket: String, details: String },

    #[error("upload to '{bucket}/{key}' failed: {details}")]
    Upload {
        bucket: String,
        key: String,
        details: String,
    },
}

/// Write-side interface of the attachment store.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Create the bucket if it does not exist yet.
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    /// Store one object under the given key.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), StorageError>;
}
