//! In-memory store for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{ObjectStorage, StorageError};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Keeps buckets and objects in a map. Cloning shares the underlying store.
#[derive(Default, Clone)]
pub struct MemoryStorage {
    buckets: Arc<RwLock<HashMap<String, HashMap<String, StoredObject>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn bucket_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.buckets.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
    }

    pub async fn object_keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .buckets
            .read()
            .await
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                details: "bucket does not exist".to_string(),
            })?;

        objects.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data: data.to_vec(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_reads_back_objects() {
        let storage = MemoryStorage::new();
        storage.ensure_bucket("1234567").await.unwrap();
        storage
            .put_object("1234567", "a.pdf", "application/pdf", b"content")
            .await
            .unwrap();

        let object = storage.object("1234567", "a.pdf").await.unwrap();
        assert_eq!(object.content_type, "application/pdf");
        assert_eq!(object.data, b"content");
        assert_eq!(storage.bucket_names().await, vec!["1234567"]);
    }

    #[tokio::test]
    async fn put_into_missing_bucket_fails() {
        let storage = MemoryStorage::new();
        let result = storage.put_object("none", "a", "text/plain", b"x").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ensure_bucket_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.ensure_bucket("b").await.unwrap();
        storage.put_object("b", "k", "t", b"1").await.unwrap();
        storage.ensure_bucket("b").await.unwrap();
        assert!(storage.object("b", "k").await.is_some());
    }
}
