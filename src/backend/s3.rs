// backend/s3.rs
// ObjectBackend over an S3-compatible server (MinIO) through aws-sdk-s3.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::{ByteStream, DateTime};
use aws_sdk_s3::{Client, Config as S3Config};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::time::SystemTime;
use tracing::{debug, info};

use super::{BackendError, BucketInfo, ObjectBackend};
use crate::config::ServerConfig;
use crate::object::Object;

#[derive(Debug, Clone)]
pub struct S3Backend {
    client: Client,
}

fn service_error<E, R>(err: SdkError<E, R>) -> BackendError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    BackendError::Service(DisplayErrorContext(&err).to_string())
}

fn to_system_time(dt: Option<&DateTime>) -> Option<SystemTime> {
    dt.and_then(|dt| SystemTime::try_from(*dt).ok())
}

impl S3Backend {
    pub fn new(config: &ServerConfig) -> Self {
        let endpoint = config.endpoint_url();
        info!("Initializing backend client for {}", endpoint);
        debug!("Using region: {}", config.region);

        let credentials = Credentials::new(
            config.access_key.as_str(),
            config.secret_key.as_str(),
            None,
            None,
            "s3-facade-static",
        );

        // MinIO-style endpoints are addressed path style.
        let s3_config = S3Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn create_bucket(&self, bucket: &str) -> Result<(), BackendError> {
        self.client
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(service_error)?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), BackendError> {
        match self.client.delete_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) if err.code() == Some("NoSuchBucket") => {
                Err(BackendError::NoSuchBucket(bucket.to_string()))
            }
            Err(err) => Err(service_error(err)),
        }
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, BackendError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false) =>
            {
                Ok(false)
            }
            Err(err) => Err(service_error(err)),
        }
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, BackendError> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(service_error)?;

        let buckets: Vec<BucketInfo> = response
            .buckets()
            .iter()
            .filter_map(|bucket| {
                bucket.name().map(|name| BucketInfo {
                    name: name.to_string(),
                    creation_date: to_system_time(bucket.creation_date()),
                })
            })
            .collect();

        debug!("Found {} buckets", buckets.len());
        Ok(buckets)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), BackendError> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(data.len() as i64)
            .body(ByteStream::from(data));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }
        match request.send().await {
            Ok(_) => Ok(()),
            Err(err) if err.code() == Some("NoSuchBucket") => {
                Err(BackendError::NoSuchBucket(bucket.to_string()))
            }
            Err(err) => Err(service_error(err)),
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Object, BackendError> {
        let response = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(response) => response,
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false) =>
            {
                return Err(BackendError::NoSuchKey(bucket.to_string(), key.to_string()));
            }
            Err(err) => return Err(service_error(err)),
        };

        let content_type = response.content_type().map(str::to_string);
        let last_modified = to_system_time(response.last_modified());
        let content_length = response
            .content_length()
            .and_then(|len| u64::try_from(len).ok());

        // Chunks are forwarded as MinIO sends them; the first read error ends the body.
        let body = stream::unfold(Some(response.body), |body| async move {
            let mut body = body?;
            match body.next().await {
                Some(Ok(chunk)) => Some((Ok(chunk), Some(body))),
                Some(Err(e)) => Some((Err(BackendError::Service(e.to_string())), None)),
                None => None,
            }
        })
        .boxed();

        Ok(Object::new(
            key,
            body,
            content_length,
            content_type,
            last_modified,
        ))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BackendError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(service_error)?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, BackendError> {
        let response = match self.client.list_objects_v2().bucket(bucket).send().await {
            Ok(response) => response,
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_no_such_bucket())
                    .unwrap_or(false) =>
            {
                return Err(BackendError::NoSuchBucket(bucket.to_string()));
            }
            Err(err) => return Err(service_error(err)),
        };
        Ok(response
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect())
    }
}
