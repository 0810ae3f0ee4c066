// object.rs
// This module defines the Object structure, an object read back from the backend.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;
use std::time::SystemTime;

use crate::backend::BackendError;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// The object's bytes as they arrive from the backend.
pub type ObjectStream = BoxStream<'static, Result<Bytes, BackendError>>;

/// Represents an object stored within a bucket of the backend object store.
/// It carries the object's key, an open body stream and the metadata needed
/// to serve it back over HTTP. The body is never held in memory as a whole.
pub struct Object {
    pub key: String,
    pub body: ObjectStream,
    /// `None` when the backend did not report a length.
    pub content_length: Option<u64>,
    pub content_type: String,
    pub last_modified: Option<SystemTime>,
}

impl Object {
    /// Creates a new Object instance around an open body stream.
    ///
    /// A missing content type falls back to `application/octet-stream`.
    pub fn new(
        key: impl Into<String>,
        body: ObjectStream,
        content_length: Option<u64>,
        content_type: Option<String>,
        last_modified: Option<SystemTime>,
    ) -> Self {
        Object {
            key: key.into(),
            body,
            content_length,
            content_type: content_type
                .filter(|ct| !ct.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            last_modified,
        }
    }

    /// Wraps bytes already in memory as a single-chunk body.
    pub fn from_bytes(
        key: impl Into<String>,
        data: Bytes,
        content_type: Option<String>,
        last_modified: Option<SystemTime>,
    ) -> Self {
        let content_length = Some(data.len() as u64);
        let body = stream::once(async move { Ok::<_, BackendError>(data) }).boxed();
        Self::new(key, body, content_length, content_type, last_modified)
    }

    /// Returns the size of the object data in bytes, if known.
    pub fn size(&self) -> Option<u64> {
        self.content_length
    }

    /// Drains the body stream into one buffer.
    pub async fn into_bytes(mut self) -> Result<Bytes, BackendError> {
        let mut data = BytesMut::with_capacity(self.content_length.unwrap_or(0) as usize);
        while let Some(chunk) = self.body.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(data.freeze())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("key", &self.key)
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .field("last_modified", &self.last_modified)
            .finish_non_exhaustive()
    }
}
