//! MinIO-backed implementation over the S3 protocol.

use async_trait::async_trait;
use core_config::storage::StorageConfig;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info};

use crate::{ObjectStorage, StorageError};

#[derive(Clone)]
pub struct S3Storage {
    region: Region,
    credentials: Credentials,
}

impl S3Storage {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Credentials(e.to_string()))?;

        Ok(Self {
            region: Region::Custom {
                region: config.region.clone(),
                endpoint: config.endpoint.clone(),
            },
            credentials,
        })
    }

    fn bucket(&self, name: &str) -> Result<Box<Bucket>, StorageError> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone()).map_err(
            |e| StorageError::Bucket {
                bucket: name.to_string(),
                details: e.to_string(),
            },
        )?;
        // MinIO serves buckets on the path, not as subdomains
        Ok(bucket.with_path_style())
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let handle = self.bucket(bucket)?;

        let exists = handle.exists().await.map_err(|e| StorageError::Bucket {
            bucket: bucket.to_string(),
            details: e.to_string(),
        })?;

        if exists {
            debug!(bucket, "bucket already exists");
            return Ok(());
        }

        Bucket::create_with_path_style(
            bucket,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| StorageError::Bucket {
            bucket: bucket.to_string(),
            details: e.to_string(),
        })?;

        info!(bucket, "created bucket");
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let handle = self.bucket(bucket)?;

        let response = handle
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                details: e.to_string(),
            })?;

        if response.status_code() != 200 {
            return Err(StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                details: format!("unexpected status {}", response.status_code()),
            });
        }

        debug!(bucket, key, size = data.len(), "stored object");
        Ok(())
    }
}
