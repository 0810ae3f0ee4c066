// config.rs
// Process configuration for the façade server and the interactive client.

use clap::Parser;
use std::path::PathBuf;

/// Configuration for the storage façade.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "s3_facade",
    about = "S3-compatible HTTP façade in front of a MinIO object store",
    version
)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[arg(long, env = "S3_FACADE_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Backend object store address (host:port)
    #[arg(long, env = "MINIO_ENDPOINT", default_value = "localhost:9000")]
    pub endpoint: String,

    #[arg(long, env = "MINIO_ACCESS_KEY", default_value = "minioadmin")]
    pub access_key: String,

    #[arg(
        long,
        env = "MINIO_SECRET_KEY",
        default_value = "miniopassword",
        hide_env_values = true
    )]
    pub secret_key: String,

    #[arg(long, env = "MINIO_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Talk to the backend over HTTPS
    #[arg(long, env = "MINIO_SECURE")]
    pub secure: bool,

    /// Number of HTTP worker threads (defaults to the number of CPUs)
    #[arg(long, env = "S3_FACADE_WORKERS")]
    pub workers: Option<usize>,
}

impl ServerConfig {
    /// Full backend URL; a bare `host:port` endpoint gets its scheme from `secure`.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            return self.endpoint.clone();
        }
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}", scheme, self.endpoint)
    }
}

/// Configuration for the interactive client.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "s3_facade_cli",
    about = "Interactive terminal client for the S3 façade",
    version
)]
pub struct ClientConfig {
    /// Base URL of the façade
    #[arg(long, env = "S3_FACADE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Directory downloaded objects are written to
    #[arg(long, env = "S3_FACADE_DOWNLOAD_DIR", default_value = ".")]
    pub download_dir: PathBuf,
}
