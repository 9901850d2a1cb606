//! Durability errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::safety::SafetyViolation;

/// Durability layer errors
#[derive(Debug, Error)]
pub enum DurabilityError {
    /// Pre-flight check refused to proceed
    #[error(transparent)]
    Blocked(#[from] SafetyViolation),

    /// Filesystem operation failed
    #[error("{operation} {}: {source}", .path.display())]
    Io {
        /// What was being done (e.g. "write staging file")
        operation: &'static str,
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Archive could not be serialized
    #[error("archive encode error: {0}")]
    Encode(String),

    /// Archive could not be parsed
    #[error("archive decode error: {0}")]
    Decode(String),
}

/// Result type for durability operations
pub type DurabilityResult<T> = std::result::Result<T, DurabilityError>;

impl DurabilityError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        DurabilityError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Underlying I/O error kind, if this is an I/O failure
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            DurabilityError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// Check if this is a pre-flight block
    pub fn is_blocked(&self) -> bool {
        matches!(self, DurabilityError::Blocked(_))
    }
}
