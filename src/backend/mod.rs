// backend/mod.rs
// The capability set the façade needs from the external object store.

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use std::time::SystemTime;
use thiserror::Error;

use crate::object::Object;

pub use memory::MemoryBackend;
pub use s3::S3Backend;

/// Errors reported by a backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Bucket '{0}' does not exist")]
    NoSuchBucket(String),
    #[error("Object '{1}' not found in bucket '{0}'")]
    NoSuchKey(String, String),
    #[error("{0}")]
    Service(String),
}

/// A bucket as reported by `list_buckets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    pub name: String,
    pub creation_date: Option<SystemTime>,
}

/// Object storage addressed by `(bucket)` or `(bucket, object)` name pairs.
///
/// Implementations must be safe to share across concurrently running
/// requests; the façade holds one instance behind an `Arc` for the
/// lifetime of the process.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    async fn create_bucket(&self, bucket: &str) -> Result<(), BackendError>;

    async fn delete_bucket(&self, bucket: &str) -> Result<(), BackendError>;

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, BackendError>;

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, BackendError>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), BackendError>;

    /// Reads the object's bytes together with its metadata.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Object, BackendError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError>;

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, BackendError>;
}
