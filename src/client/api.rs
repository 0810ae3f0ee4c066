// client/api.rs
// Blocking HTTP calls against the façade, one method per operation.

use bytes::Bytes;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::ClientError;
use super::decode::{parse_all_names, parse_s3_error};
use crate::object::DEFAULT_CONTENT_TYPE;

pub struct ApiClient {
    base_url: Url,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            http: Client::new(),
        })
    }

    /// Builds `{base}/{segment}/...`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        if segments.is_empty() {
            return Ok(url);
        }
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
    ) -> Result<Response, ClientError> {
        let url = self.url(segments)?;
        debug!("{} {}", method, url);
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, DEFAULT_CONTENT_TYPE).body(body);
        }
        Ok(request.send()?)
    }

    /// Turns a status of 400 or above into a decoded fault.
    fn check(response: Response) -> Result<Response, ClientError> {
        if response.status().as_u16() >= 400 {
            let body = response.bytes()?;
            return Err(ClientError::Fault(parse_s3_error(&body)));
        }
        Ok(response)
    }

    fn names(&self, segments: &[&str]) -> Result<Vec<String>, ClientError> {
        let body = self.send(Method::GET, segments, None)?.bytes()?;
        Ok(parse_all_names(&body))
    }

    pub fn create_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        Self::check(self.send(Method::PUT, &[bucket], None)?)?;
        Ok(())
    }

    /// Bucket names from `GET /`. Whatever does not decode as a name is ignored.
    pub fn list_buckets(&self) -> Result<Vec<String>, ClientError> {
        self.names(&[])
    }

    /// Object keys from `GET /{bucket}`, decoded the same way as the bucket listing.
    pub fn list_objects(&self, bucket: &str) -> Result<Vec<String>, ClientError> {
        self.names(&[bucket])
    }

    pub fn upload(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<(), ClientError> {
        Self::check(self.send(Method::PUT, &[bucket, key], Some(data))?)?;
        Ok(())
    }

    pub fn upload_file(&self, bucket: &str, path: &Path) -> Result<String, ClientError> {
        let key = file_name(path)?;
        let data = fs::read(path)?;
        self.upload(bucket, &key, data)?;
        Ok(key)
    }

    pub fn download(&self, bucket: &str, key: &str) -> Result<Bytes, ClientError> {
        let response = Self::check(self.send(Method::GET, &[bucket, key], None)?)?;
        Ok(response.bytes()?)
    }

    /// Downloads an object into `dir`, named after its key.
    pub fn download_to(&self, bucket: &str, key: &str, dir: &Path) -> Result<PathBuf, ClientError> {
        let target = dir.join(file_name(Path::new(key))?);
        let content = self.download(bucket, key)?;
        fs::write(&target, &content)?;
        Ok(target)
    }

    pub fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        Self::check(self.send(Method::DELETE, &[bucket, key], None)?)?;
        Ok(())
    }

    pub fn delete_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        Self::check(self.send(Method::DELETE, &[bucket], None)?)?;
        Ok(())
    }
}

fn file_name(path: &Path) -> Result<String, ClientError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ClientError::InvalidFileName(path.display().to_string()))
}
