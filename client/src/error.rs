//! Error handling for the native NMP host

use nmp_shared::NmpError;
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Plan(#[from] NmpError),

    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog endpoint {endpoint} returned status {status}")]
    Upstream { endpoint: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
