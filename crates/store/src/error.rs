//! Store errors

use std::path::PathBuf;

use thiserror::Error;

/// Store client errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credentials file missing or malformed
    #[error("credentials {}: {message}", .path.display())]
    Credentials {
        /// Credentials file path
        path: PathBuf,
        /// What was wrong
        message: String,
    },

    /// Access token could not be obtained
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Store answered with an error status
    #[error("{operation} failed with HTTP {status}: {body}")]
    Http {
        /// Operation (e.g. "fetch orders")
        operation: String,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Request never produced a response (DNS, TLS, timeout, ...)
    #[error("{operation} failed: {message}")]
    Transport {
        /// Operation
        operation: String,
        /// Transport error message
        message: String,
    },

    /// Response could not be interpreted
    #[error("{operation}: malformed response: {message}")]
    Decode {
        /// Operation
        operation: String,
        /// What was wrong
        message: String,
    },

    /// Failure produced by a test store
    #[error("{0}")]
    Injected(String),
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Build from a ureq error for the given operation
    pub(crate) fn from_ureq(operation: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => StoreError::Http {
                operation: operation.to_string(),
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => StoreError::Transport {
                operation: operation.to_string(),
                message: transport.to_string(),
            },
        }
    }

    pub(crate) fn decode(operation: &str, message: impl Into<String>) -> Self {
        StoreError::Decode {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Check if the store rejected the caller's identity or permissions
    pub fn is_auth(&self) -> bool {
        match self {
            StoreError::Auth(_) => true,
            StoreError::Http { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}
