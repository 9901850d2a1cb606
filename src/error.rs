//! Unified error type for orderarchive.

use thiserror::Error;

use orderarchive_engine::{ErrorClass, TransferError, TransferReport};

/// All orderarchive errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A migration run aborted
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Result type for orderarchive operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Outcome category; determines the process exit code.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Transfer(e) => e.class(),
        }
    }

    /// Check if the run was refused before anything was changed.
    pub fn is_precondition(&self) -> bool {
        self.class() == ErrorClass::Precondition
    }

    /// Check if archived orders may still be present in the store.
    pub fn is_duplication_risk(&self) -> bool {
        match self {
            Error::Transfer(e) => e.is_duplication_risk(),
        }
    }

    /// Partial report of the aborted run.
    pub fn report(&self) -> &TransferReport {
        match self {
            Error::Transfer(e) => &e.report,
        }
    }
}
