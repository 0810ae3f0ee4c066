// backend/memory.rs
// In-process object store with the same observable behaviour as an S3 server.
// Used as the backend double in tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::time::SystemTime;
use tokio::sync::RwLock;

use super::{BackendError, BucketInfo, ObjectBackend};
use crate::object::Object;

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    last_modified: SystemTime,
}

struct BucketEntry {
    created_at: SystemTime,
    objects: BTreeMap<String, StoredObject>,
}

#[derive(Default)]
pub struct MemoryBackend {
    buckets: RwLock<BTreeMap<String, BucketEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectBackend for MemoryBackend {
    async fn create_bucket(&self, bucket: &str) -> Result<(), BackendError> {
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(bucket) {
            return Err(BackendError::Service(format!(
                "Bucket '{}' already exists",
                bucket
            )));
        }
        buckets.insert(
            bucket.to_string(),
            BucketEntry {
                created_at: SystemTime::now(),
                objects: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), BackendError> {
        let mut buckets = self.buckets.write().await;
        let Some(entry) = buckets.get(bucket) else {
            return Err(BackendError::NoSuchBucket(bucket.to_string()));
        };
        if !entry.objects.is_empty() {
            return Err(BackendError::Service(format!(
                "Bucket '{}' is not empty",
                bucket
            )));
        }
        buckets.remove(bucket);
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, BackendError> {
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, BackendError> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .iter()
            .map(|(name, entry)| BucketInfo {
                name: name.clone(),
                creation_date: Some(entry.created_at),
            })
            .collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), BackendError> {
        let mut buckets = self.buckets.write().await;
        let entry = buckets
            .get_mut(bucket)
            .ok_or_else(|| BackendError::NoSuchBucket(bucket.to_string()))?;
        let object = StoredObject {
            data,
            content_type: content_type.map(str::to_string),
            last_modified: SystemTime::now(),
        };
        entry.objects.insert(key.to_string(), object);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Object, BackendError> {
        let buckets = self.buckets.read().await;
        let stored = buckets
            .get(bucket)
            .ok_or_else(|| BackendError::NoSuchBucket(bucket.to_string()))?
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| BackendError::NoSuchKey(bucket.to_string(), key.to_string()))?;
        Ok(Object::from_bytes(
            key,
            stored.data,
            stored.content_type,
            Some(stored.last_modified),
        ))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError> {
        let mut buckets = self.buckets.write().await;
        let entry = buckets
            .get_mut(bucket)
            .ok_or_else(|| BackendError::NoSuchBucket(bucket.to_string()))?;
        entry.objects.remove(key);
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, BackendError> {
        let buckets = self.buckets.read().await;
        let entry = buckets
            .get(bucket)
            .ok_or_else(|| BackendError::NoSuchBucket(bucket.to_string()))?;
        Ok(entry.objects.keys().cloned().collect())
    }
}
