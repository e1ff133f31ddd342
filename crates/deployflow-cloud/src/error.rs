//! Deployment client error types

use thiserror::Error;

/// Deployment client errors
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid resources: {0}")]
    InvalidResources(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The remote operation finished with errors. Holds the first
    /// reported message verbatim.
    #[error("{0}")]
    OperationFailed(String),

    #[error("Timeout: operation {operation} still {status} after {elapsed_secs}s")]
    Timeout {
        operation: String,
        status: String,
        elapsed_secs: u64,
    },

    #[error("Cancelled while waiting for operation {0}")]
    Cancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    /// Whether this error was reported by the remote service for a
    /// finished operation, as opposed to a local or transport failure.
    pub fn is_operation_failure(&self) -> bool {
        matches!(self, DeployError::OperationFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
