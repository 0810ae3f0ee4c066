// fault.rs
// S3-style faults and their XML rendering.

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpResponse, error::ResponseError};
use quick_xml::se::to_string;
use serde::Serialize;
use thiserror::Error;

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// Every way a façade request can fail. Each variant renders as exactly one
/// status code and one `<Error>` document.
#[derive(Debug, Error)]
pub enum S3Error {
    #[error(
        "Your previous request to create the named bucket succeeded and you already own it."
    )]
    BucketAlreadyOwnedByYou(String),
    #[error("The specified bucket does not exist")]
    NoSuchBucket(String),
    #[error("The bucket you tried to delete is not empty")]
    BucketNotEmpty(String),
    #[error("The specified key does not exist.")]
    NoSuchKey,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("At least one of the pre-conditions you specified did not hold")]
    PreconditionFailed,
    #[error("The specified method is not allowed against this resource.")]
    MethodNotAllowed,
    #[error("{0}")]
    InternalError(String),
}

impl S3Error {
    /// The fault code token carried in `<Code>`.
    pub fn code(&self) -> &'static str {
        match self {
            S3Error::BucketAlreadyOwnedByYou(_) => "BucketAlreadyOwnedByYou",
            S3Error::NoSuchBucket(_) => "NoSuchBucket",
            S3Error::BucketNotEmpty(_) => "BucketNotEmpty",
            S3Error::NoSuchKey => "NoSuchKey",
            S3Error::InvalidRequest(_) => "InvalidRequest",
            S3Error::PreconditionFailed => "PreconditionFailed",
            S3Error::MethodNotAllowed => "MethodNotAllowed",
            S3Error::InternalError(_) => "InternalError",
        }
    }

    /// The bucket a bucket-scoped fault refers to.
    pub fn bucket_name(&self) -> Option<&str> {
        match self {
            S3Error::BucketAlreadyOwnedByYou(bucket)
            | S3Error::NoSuchBucket(bucket)
            | S3Error::BucketNotEmpty(bucket) => Some(bucket),
            _ => None,
        }
    }

    pub fn to_document(&self) -> FaultDocument {
        FaultDocument {
            code: self.code().to_string(),
            message: self.to_string(),
            bucket_name: self.bucket_name().map(str::to_string),
        }
    }
}

/// The `<Error>` body returned in place of a success response.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename = "Error")]
pub struct FaultDocument {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "BucketName", skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
}

impl FaultDocument {
    pub fn to_xml(&self) -> Result<String, Box<dyn std::error::Error>> {
        let mut xml = String::from(XML_DECLARATION);
        xml.push_str(&to_string(self).map_err(|e| Box::new(e) as Box<dyn std::error::Error>)?);
        Ok(xml)
    }
}

impl ResponseError for S3Error {
    fn error_response(&self) -> HttpResponse {
        let body = self.to_document().to_xml().unwrap_or_else(|_| {
            // Only reachable if serialization itself breaks; keep the body well-formed.
            format!(
                "{}<Error><Code>InternalError</Code><Message>fault rendering failed</Message></Error>",
                XML_DECLARATION
            )
        });
        HttpResponse::build(self.status_code())
            .insert_header((CONTENT_TYPE, XML_CONTENT_TYPE))
            .body(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            S3Error::BucketAlreadyOwnedByYou(_) => StatusCode::CONFLICT,
            S3Error::NoSuchBucket(_) => StatusCode::NOT_FOUND,
            S3Error::BucketNotEmpty(_) => StatusCode::CONFLICT,
            S3Error::NoSuchKey => StatusCode::NOT_FOUND,
            S3Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            S3Error::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            S3Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            S3Error::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
