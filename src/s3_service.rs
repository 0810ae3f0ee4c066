// s3_service.rs
// Translates backend outcomes into S3 faults, one method per operation.
use bytes::Bytes;
use std::sync::Arc;
use tracing::warn;

use crate::backend::{BucketInfo, ObjectBackend};
use crate::fault::S3Error;
use crate::object::Object;

/// Fronts an [`ObjectBackend`] and decides which fault a failed call becomes.
///
/// When the backend's failure alone is ambiguous, a secondary `bucket_exists`
/// probe picks the code. The probe runs after the failing call, so a
/// concurrent change to the bucket can produce a misleading code; the
/// backend stays the only source of truth.
#[derive(Clone)]
pub struct S3Service {
    backend: Arc<dyn ObjectBackend>,
}

impl S3Service {
    pub fn new(backend: Arc<dyn ObjectBackend>) -> Self {
        S3Service { backend }
    }

    /// A failed probe counts as "does not exist".
    async fn probe_bucket(&self, bucket: &str) -> bool {
        match self.backend.bucket_exists(bucket).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(error = %e, bucket, "Bucket existence probe failed");
                false
            }
        }
    }

    /// Creates a new bucket.
    ///
    /// # Returns
    ///
    /// * `Err(S3Error::BucketAlreadyOwnedByYou)` - if creation failed and the bucket exists.
    /// * `Err(S3Error::InternalError)` - for any other backend failure.
    pub async fn create_bucket(&self, name: &str) -> Result<(), S3Error> {
        match self.backend.create_bucket(name).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if self.probe_bucket(name).await {
                    Err(S3Error::BucketAlreadyOwnedByYou(name.to_string()))
                } else {
                    Err(S3Error::InternalError(e.to_string()))
                }
            }
        }
    }

    /// Deletes a bucket.
    ///
    /// # Returns
    ///
    /// * `Err(S3Error::NoSuchBucket)` - if deletion failed and the bucket is gone.
    /// * `Err(S3Error::BucketNotEmpty)` - if deletion failed but the bucket still exists.
    pub async fn delete_bucket(&self, name: &str) -> Result<(), S3Error> {
        match self.backend.delete_bucket(name).await {
            Ok(()) => Ok(()),
            Err(_) => {
                if self.probe_bucket(name).await {
                    Err(S3Error::BucketNotEmpty(name.to_string()))
                } else {
                    Err(S3Error::NoSuchBucket(name.to_string()))
                }
            }
        }
    }

    /// Lists all buckets.
    pub async fn list_buckets(&self) -> Result<Vec<BucketInfo>, S3Error> {
        self.backend
            .list_buckets()
            .await
            .map_err(|e| S3Error::InternalError(e.to_string()))
    }

    /// Checks that the target bucket of an upload exists.
    ///
    /// Runs before the request body is read, so a missing bucket wins over
    /// an unreadable body.
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<(), S3Error> {
        if self.probe_bucket(bucket).await {
            Ok(())
        } else {
            Err(S3Error::NoSuchBucket(bucket.to_string()))
        }
    }

    /// Writes an object into a bucket.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), S3Error> {
        self.backend
            .put_object(bucket, key, data, content_type)
            .await
            .map_err(|e| S3Error::InternalError(e.to_string()))
    }

    /// Opens an object for reading. Every backend failure reads as a missing key.
    ///
    /// The fault drops the backend's reason, so it is logged here and only here.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Object, S3Error> {
        self.backend.get_object(bucket, key).await.map_err(|e| {
            warn!(error = %e, bucket, key, code = "NoSuchKey", "Failed to retrieve object");
            S3Error::NoSuchKey
        })
    }

    /// Deletes an object from a bucket.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), S3Error> {
        self.backend
            .delete_object(bucket, key)
            .await
            .map_err(|e| S3Error::InternalError(e.to_string()))
    }
}
