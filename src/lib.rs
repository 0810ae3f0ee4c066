pub mod backend;
pub mod client;
pub mod config;
pub mod fault;
pub mod handlers;
pub mod logging;
pub mod object;
pub mod router;
pub mod s3_service;
pub mod structs;

// re-export the types
pub use backend::{BackendError, BucketInfo, MemoryBackend, ObjectBackend, S3Backend};
pub use config::{ClientConfig, ServerConfig};
pub use fault::{FaultDocument, S3Error};
pub use object::Object;
pub use s3_service::S3Service;
