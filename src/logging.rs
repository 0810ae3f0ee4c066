use tracing_subscriber::{EnvFilter, fmt};

/// Initialize tracing for the server with the JSON formatter.
pub fn init_logging() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .init();
}

/// Initialize tracing for the interactive client. Output goes to stderr so it
/// does not interleave with the menu, and stays quiet unless RUST_LOG asks.
pub fn init_client_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
