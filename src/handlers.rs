use actix_web::http::header::{
    CONTENT_TYPE, Header, HttpDate, IfModifiedSince, IfUnmodifiedSince, LastModified,
};
use actix_web::body::SizedStream;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

use crate::S3Service;
use crate::fault::{S3Error, XML_CONTENT_TYPE};
use crate::object::Object;
use crate::structs::ListBucketsResponse;

fn log_fault(e: &S3Error, what: &str) {
    if e.status_code().is_server_error() {
        error!(error = %e, code = e.code(), "{}", what);
    } else {
        warn!(error = %e, code = e.code(), "{}", what);
    }
}

/// Handles GET /
/// Lists all buckets as a `ListAllMyBucketsResult` document.
///
/// # Arguments
///
/// * `s3_service` - The shared fault-translating service.
///
/// # Returns
///
/// * `Result<HttpResponse, S3Error>` - 200 with the XML listing, or an `InternalError` fault.
pub async fn list_buckets_handler(
    s3_service: web::Data<S3Service>,
) -> Result<HttpResponse, S3Error> {
    let buckets = s3_service.list_buckets().await.inspect_err(|e| {
        log_fault(e, "Failed to list buckets");
    })?;
    info!("Listed {} buckets.", buckets.len());

    let body = ListBucketsResponse::from_buckets(buckets)
        .to_xml()
        .map_err(|e| S3Error::InternalError(e.to_string()))?;
    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, XML_CONTENT_TYPE))
        .body(body))
}

/// Handles PUT /{bucket}
/// Creates a new bucket.
///
/// # Arguments
///
/// * `s3_service` - The shared fault-translating service.
/// * `path` - The name of the bucket to create.
///
/// # Returns
///
/// * `Result<HttpResponse, S3Error>` - 200 with an empty body, or a
///   `BucketAlreadyOwnedByYou` / `InternalError` fault.
#[tracing::instrument(name = "Create bucket", skip(s3_service), fields(bucket = %path.as_str()))]
pub async fn create_bucket_handler(
    s3_service: web::Data<S3Service>,
    path: web::Path<String>,
) -> Result<HttpResponse, S3Error> {
    let bucket_name = path.into_inner();
    match s3_service.create_bucket(&bucket_name).await {
        Ok(()) => {
            info!("Bucket '{}' created.", bucket_name);
            Ok(HttpResponse::Ok().finish())
        }
        Err(e) => {
            log_fault(&e, "Failed to create bucket");
            Err(e)
        }
    }
}

/// Handles DELETE /{bucket}
/// Deletes an existing, empty bucket.
///
/// # Arguments
///
/// * `s3_service` - The shared fault-translating service.
/// * `path` - The name of the bucket to delete.
///
/// # Returns
///
/// * `Result<HttpResponse, S3Error>` - 204, or a `NoSuchBucket` / `BucketNotEmpty` fault.
#[tracing::instrument(name = "Delete bucket", skip(s3_service), fields(bucket = %path.as_str()))]
pub async fn delete_bucket_handler(
    s3_service: web::Data<S3Service>,
    path: web::Path<String>,
) -> Result<HttpResponse, S3Error> {
    let bucket_name = path.into_inner();
    match s3_service.delete_bucket(&bucket_name).await {
        Ok(()) => {
            info!("Bucket '{}' deleted.", bucket_name);
            Ok(HttpResponse::NoContent().finish())
        }
        Err(e) => {
            log_fault(&e, "Failed to delete bucket");
            Err(e)
        }
    }
}

/// Drains a request body. A broken stream is the client's fault.
pub async fn read_body<S, E>(mut payload: S) -> Result<Bytes, S3Error>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| S3Error::InvalidRequest(e.to_string()))?;
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Handles PUT /{bucket}/{object}
/// Stores the raw request body as the object's content.
///
/// # Arguments
///
/// * `req` - The request, read for its `Content-Type`.
/// * `s3_service` - The shared fault-translating service.
/// * `path` - The target bucket and object key.
/// * `payload` - The object's bytes.
///
/// # Returns
///
/// * `Result<HttpResponse, S3Error>` - 200 with an empty body, or a
///   `NoSuchBucket` / `InvalidRequest` / `InternalError` fault.
#[tracing::instrument(
    name = "Put object",
    skip(s3_service, payload, req),
    fields(
        bucket = %path.0,
        object_key = %path.1
    )
)]
pub async fn put_object_handler(
    req: HttpRequest,
    s3_service: web::Data<S3Service>,
    path: web::Path<(String, String)>,
    payload: web::Payload,
) -> Result<HttpResponse, S3Error> {
    let (bucket_name, object_key) = path.into_inner();

    let result = async {
        s3_service.ensure_bucket(&bucket_name).await?;

        let body = read_body(payload).await?;

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());

        let size = body.len();
        s3_service
            .put_object(&bucket_name, &object_key, body, content_type)
            .await?;
        Ok::<usize, S3Error>(size)
    }
    .await;

    match result {
        Ok(size) => {
            info!(
                object_size = size,
                "Object '{}' put into bucket '{}'.", object_key, bucket_name
            );
            Ok(HttpResponse::Ok().finish())
        }
        Err(e) => {
            log_fault(&e, "Failed to store object");
            Err(e)
        }
    }
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Evaluates `If-Unmodified-Since` / `If-Modified-Since` against the object.
/// HTTP dates carry whole seconds, so the comparison does too.
fn check_preconditions(
    req: &HttpRequest,
    last_modified: SystemTime,
) -> Result<Option<HttpResponse>, S3Error> {
    let modified = unix_secs(last_modified);

    if let Ok(IfUnmodifiedSince(since)) = IfUnmodifiedSince::parse(req) {
        if modified > unix_secs(SystemTime::from(since)) {
            return Err(S3Error::PreconditionFailed);
        }
    }

    if let Ok(IfModifiedSince(since)) = IfModifiedSince::parse(req) {
        if modified <= unix_secs(SystemTime::from(since)) {
            return Ok(Some(
                HttpResponse::NotModified()
                    .insert_header(LastModified(HttpDate::from(last_modified)))
                    .finish(),
            ));
        }
    }

    Ok(None)
}

fn object_response(req: &HttpRequest, object: Object) -> Result<HttpResponse, S3Error> {
    let mut response = HttpResponse::Ok();
    if let Some(last_modified) = object.last_modified {
        if let Some(not_modified) = check_preconditions(req, last_modified)? {
            return Ok(not_modified);
        }
        response.insert_header(LastModified(HttpDate::from(last_modified)));
    }
    response.insert_header((CONTENT_TYPE, object.content_type.as_str()));
    // A sized stream sends Content-Length instead of chunked encoding.
    Ok(match object.content_length {
        Some(len) => response.body(SizedStream::new(len, object.body)),
        None => response.streaming(object.body),
    })
}

/// Handles GET /{bucket}/{object}
/// Streams the object's bytes back with its content type.
///
/// # Arguments
///
/// * `req` - The request, read for conditional headers.
/// * `s3_service` - The shared fault-translating service.
/// * `path` - The bucket and key of the object to retrieve.
///
/// # Returns
///
/// * `Result<HttpResponse, S3Error>` - 200 with the streamed body, 304, or a
///   `NoSuchKey` / `PreconditionFailed` fault.
#[tracing::instrument(
    name = "Get object",
    skip(s3_service, req),
    fields(
        bucket = %path.0,
        object_key = %path.1
    )
)]
pub async fn get_object_handler(
    req: HttpRequest,
    s3_service: web::Data<S3Service>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, S3Error> {
    let (bucket_name, object_key) = path.into_inner();
    // Backend read failures are logged with their cause by the service.
    let object = s3_service.get_object(&bucket_name, &object_key).await?;
    info!(
        object_size = ?object.size(),
        "Object '{}' retrieved from bucket '{}'.", object.key, bucket_name
    );
    object_response(&req, object).inspect_err(|e| log_fault(e, "Failed to retrieve object"))
}

/// Handles DELETE /{bucket}/{object}
/// Deletes an object from a bucket.
///
/// # Arguments
///
/// * `s3_service` - The shared fault-translating service.
/// * `path` - The bucket and key of the object to delete.
///
/// # Returns
///
/// * `Result<HttpResponse, S3Error>` - 204, or an `InternalError` fault.
#[tracing::instrument(
    name = "Delete object",
    skip(s3_service),
    fields(
        bucket = %path.0,
        object_key = %path.1
    )
)]
pub async fn delete_object_handler(
    s3_service: web::Data<S3Service>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, S3Error> {
    let (bucket_name, object_key) = path.into_inner();
    match s3_service.delete_object(&bucket_name, &object_key).await {
        Ok(()) => {
            info!(
                "Object '{}' deleted from bucket '{}'.",
                object_key, bucket_name
            );
            Ok(HttpResponse::NoContent().finish())
        }
        Err(e) => {
            log_fault(&e, "Failed to delete object");
            Err(e)
        }
    }
}

/// A routed path with a method the façade does not serve, `GET /{bucket}` included.
pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, S3Error> {
    warn!(method = %req.method(), path = req.path(), "Method not allowed");
    Err(S3Error::MethodNotAllowed)
}

/// Any path that is neither `/`, `/{bucket}` nor `/{bucket}/{object}`.
pub async fn unsupported_path(req: HttpRequest) -> Result<HttpResponse, S3Error> {
    warn!(method = %req.method(), path = req.path(), "Unsupported path");
    Err(S3Error::InvalidRequest(format!(
        "Unsupported request path: {}",
        req.path()
    )))
}
