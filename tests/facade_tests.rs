use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use std::sync::{Arc, Mutex};

use s3_facade::client::decode::{parse_all_names, parse_s3_error};
use s3_facade::{
    BackendError, BucketInfo, MemoryBackend, Object, ObjectBackend, S3Service, router,
};

macro_rules! facade {
    ($backend:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(S3Service::new($backend)))
                .configure(router::configure),
        )
        .await
    };
}

fn memory() -> Arc<dyn ObjectBackend> {
    Arc::new(MemoryBackend::new())
}

fn fault_code(body: &[u8]) -> String {
    let summary = parse_s3_error(body);
    summary
        .split_once(": ")
        .map(|(code, _)| code.to_string())
        .unwrap_or(summary)
}

/// Every call fails; the existence probe answers `exists` (or fails when `None`).
struct FailingBackend {
    exists: Option<bool>,
}

fn unavailable() -> BackendError {
    BackendError::Service("backend unavailable".to_string())
}

#[async_trait]
impl ObjectBackend for FailingBackend {
    async fn create_bucket(&self, _bucket: &str) -> Result<(), BackendError> {
        Err(unavailable())
    }

    async fn delete_bucket(&self, _bucket: &str) -> Result<(), BackendError> {
        Err(unavailable())
    }

    async fn bucket_exists(&self, _bucket: &str) -> Result<bool, BackendError> {
        self.exists.ok_or_else(unavailable)
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, BackendError> {
        Err(unavailable())
    }

    async fn put_object(
        &self,
        _bucket: &str,
        _key: &str,
        _data: Bytes,
        _content_type: Option<&str>,
    ) -> Result<(), BackendError> {
        Err(unavailable())
    }

    async fn get_object(&self, _bucket: &str, _key: &str) -> Result<Object, BackendError> {
        Err(unavailable())
    }

    async fn delete_object(&self, _bucket: &str, _key: &str) -> Result<(), BackendError> {
        Err(unavailable())
    }

    async fn list_objects(&self, _bucket: &str) -> Result<Vec<String>, BackendError> {
        Err(unavailable())
    }
}

fn failing(exists: Option<bool>) -> Arc<dyn ObjectBackend> {
    Arc::new(FailingBackend { exists })
}

#[actix_web::test]
async fn test_bucket_and_object_lifecycle() {
    let app = facade!(memory());
    let content = "Hello world from test A";

    let req = test::TestRequest::put().uri("/bucket-a").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(parse_all_names(&body), vec!["bucket-a"]);

    let req = test::TestRequest::put()
        .uri("/bucket-a/file-a.txt")
        .set_payload(content)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/bucket-a/file-a.txt")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/octet-stream"
    );
    assert!(resp.headers().contains_key("last-modified"));
    let body = test::read_body(resp).await;
    assert_eq!(body, Bytes::from(content));

    let req = test::TestRequest::delete()
        .uri("/bucket-a/file-a.txt")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri("/bucket-a/file-a.txt")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(fault_code(&test::read_body(resp).await), "NoSuchKey");

    let req = test::TestRequest::delete().uri("/bucket-a").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri("/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert!(parse_all_names(&body).is_empty());
}

#[actix_web::test]
async fn test_binary_content_and_content_type() {
    let app = facade!(memory());
    let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    let req = test::TestRequest::put().uri("/bin").to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::put()
        .uri("/bin/blob")
        .set_payload(data.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri("/bin/note.txt")
        .insert_header(("content-type", "text/plain"))
        .set_payload("note")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/bin/blob").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body.as_ref(), data.as_slice());

    let req = test::TestRequest::get().uri("/bin/note.txt").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("content-type").unwrap(), "text/plain");
}

#[actix_web::test]
async fn test_create_existing_bucket_conflicts() {
    let app = facade!(memory());

    let req = test::TestRequest::put().uri("/dup").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::put().uri("/dup").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/xml"
    );
    let body = test::read_body(resp).await;
    assert_eq!(fault_code(&body), "BucketAlreadyOwnedByYou");
    assert!(
        String::from_utf8_lossy(&body).contains("<BucketName>dup</BucketName>"),
        "bucket-scoped fault names the bucket"
    );
}

#[actix_web::test]
async fn test_delete_bucket_faults() {
    let app = facade!(memory());

    let req = test::TestRequest::delete().uri("/missing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(fault_code(&test::read_body(resp).await), "NoSuchBucket");

    let req = test::TestRequest::put().uri("/full").to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::put()
        .uri("/full/a")
        .set_payload("a")
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::delete().uri("/full").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(fault_code(&test::read_body(resp).await), "BucketNotEmpty");
}

#[actix_web::test]
async fn test_upload_into_missing_bucket() {
    let app = facade!(memory());
    let req = test::TestRequest::put()
        .uri("/nowhere/file.txt")
        .set_payload("data")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(fault_code(&test::read_body(resp).await), "NoSuchBucket");
}

#[actix_web::test]
async fn test_download_missing_key() {
    let app = facade!(memory());
    let req = test::TestRequest::put().uri("/b").to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/b/nothing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(
        parse_s3_error(&body),
        "NoSuchKey: The specified key does not exist."
    );
}

#[actix_web::test]
async fn test_backend_failures_become_faults() {
    // (backend, method, uri, status, code)
    let cases = [
        (failing(Some(false)), "PUT", "/b", 500, "InternalError"),
        (failing(Some(true)), "PUT", "/b", 409, "BucketAlreadyOwnedByYou"),
        (failing(Some(false)), "DELETE", "/b", 404, "NoSuchBucket"),
        (failing(Some(true)), "DELETE", "/b", 409, "BucketNotEmpty"),
        (failing(None), "DELETE", "/b", 404, "NoSuchBucket"),
        (failing(Some(true)), "GET", "/", 500, "InternalError"),
        (failing(Some(false)), "PUT", "/b/k", 404, "NoSuchBucket"),
        (failing(None), "PUT", "/b/k", 404, "NoSuchBucket"),
        (failing(Some(true)), "PUT", "/b/k", 500, "InternalError"),
        (failing(Some(true)), "GET", "/b/k", 404, "NoSuchKey"),
        (failing(Some(true)), "DELETE", "/b/k", 500, "InternalError"),
    ];

    for (backend, method, uri, status, code) in cases {
        let app = facade!(backend);
        let req = match method {
            "PUT" => test::TestRequest::put().set_payload("x"),
            "DELETE" => test::TestRequest::delete(),
            _ => test::TestRequest::get(),
        }
        .uri(uri)
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), status, "{} {}", method, uri);
        let body = test::read_body(resp).await;
        assert_eq!(fault_code(&body), code, "{} {}", method, uri);
    }
}

#[actix_web::test]
async fn test_internal_error_carries_backend_text() {
    let app = facade!(failing(Some(false)));
    let req = test::TestRequest::put().uri("/b").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(parse_s3_error(&body), "InternalError: backend unavailable");
}

#[actix_web::test]
async fn test_unrouted_requests_are_faults() {
    let app = facade!(memory());

    // Listing a bucket's objects is not a façade operation.
    let req = test::TestRequest::get().uri("/bucket-a").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = test::read_body(resp).await;
    assert_eq!(fault_code(&body), "MethodNotAllowed");
    assert!(parse_all_names(&body).is_empty());

    let req = test::TestRequest::post().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let req = test::TestRequest::get().uri("/a/b/c").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fault_code(&test::read_body(resp).await), "InvalidRequest");
}

#[actix_web::test]
async fn test_conditional_download() {
    let app = facade!(memory());
    let req = test::TestRequest::put().uri("/c").to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::put()
        .uri("/c/obj")
        .set_payload("v1")
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/c/obj")
        .insert_header(("if-modified-since", "Fri, 01 Jan 2100 00:00:00 GMT"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    assert!(test::read_body(resp).await.is_empty());

    let req = test::TestRequest::get()
        .uri("/c/obj")
        .insert_header(("if-modified-since", "Thu, 01 Jan 1970 00:00:00 GMT"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/c/obj")
        .insert_header(("if-unmodified-since", "Thu, 01 Jan 1970 00:00:00 GMT"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(fault_code(&test::read_body(resp).await), "PreconditionFailed");
}

/// Collects formatted log output for the current thread's subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[actix_web::test]
async fn test_failed_download_is_logged_once() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = facade!(failing(Some(true)));
    let req = test::TestRequest::get().uri("/b/k").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let warnings: Vec<&str> = output.lines().filter(|l| l.contains("WARN")).collect();
    assert_eq!(warnings.len(), 1, "{}", output);
    assert!(warnings[0].contains("backend unavailable"));
}
