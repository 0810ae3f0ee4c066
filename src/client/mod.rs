// client/mod.rs
// The interactive terminal client for the façade.

pub mod api;
pub mod decode;
pub mod menu;

use thiserror::Error;

pub use api::ApiClient;

/// Errors surfaced to the menu loop. None of them end the session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A fault returned by the façade, already summarised as `Code: Message`.
    #[error("{0}")]
    Fault(String),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
    #[error("'{0}' has no file name")]
    InvalidFileName(String),
}
