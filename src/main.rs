// main.rs
// Sets up the HTTP server exposing the S3-compatible façade.

use actix_web::{App, HttpServer, web};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

use s3_facade::logging::init_logging;
use s3_facade::{S3Backend, S3Service, ServerConfig, router};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = ServerConfig::parse();
    info!(
        "Starting S3 façade on http://{} (backend {})",
        config.listen,
        config.endpoint_url()
    );

    // One backend client for the whole process, shared by every worker.
    let s3_service = S3Service::new(Arc::new(S3Backend::new(&config)));
    let s3_service_data = web::Data::new(s3_service);

    let mut server = HttpServer::new(move || {
        App::new()
            // Add tracing middleware for request logging
            .wrap(TracingLogger::default())
            .app_data(s3_service_data.clone())
            .configure(router::configure)
    })
    .bind(config.listen.as_str())?;

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.run().await
}
