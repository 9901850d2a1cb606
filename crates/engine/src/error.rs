//! Transfer errors and their exit classes

use std::io;
use std::path::PathBuf;

use orderarchive_core::{LineItemError, ShapeError, TransferId};
use orderarchive_durability::{DurabilityError, SafetyViolation};
use orderarchive_store::StoreError;
use thiserror::Error;

use crate::report::TransferReport;
use crate::state::TransferState;
use crate::transform::TransformError;

/// Coarse outcome category, mapped to the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Run completed
    Ok,
    /// Bad command-line arguments
    Usage,
    /// Staging file, existing archive or held lock
    Precondition,
    /// Fetch, credentials or authentication failure
    Store,
    /// Missing or mistyped document fields
    Shape,
    /// Local filesystem failure while locking or writing
    Archive,
    /// Delete failed after the archive was committed
    Purge,
}

impl ErrorClass {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorClass::Ok => 0,
            ErrorClass::Usage => 2,
            ErrorClass::Precondition => 3,
            ErrorClass::Store => 4,
            ErrorClass::Shape => 5,
            ErrorClass::Archive => 6,
            ErrorClass::Purge => 7,
        }
    }
}

/// Cause of an aborted transfer
#[derive(Debug, Error)]
pub enum TransferErrorKind {
    /// Pre-flight check refused the run
    #[error(transparent)]
    Blocked(#[from] SafetyViolation),

    /// Lock marker location could not be determined
    #[error("cannot determine lock marker location: {0}")]
    LockLocation(#[source] io::Error),

    /// Lock marker could not be created
    #[error("cannot acquire lock: {0}")]
    Lock(#[source] DurabilityError),

    /// Snapshot fetch failed
    #[error("fetch from {store} failed: {source}")]
    Fetch {
        /// Store description
        store: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// Document shape invalid
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Undecodable line item under the `fail` policy
    #[error(transparent)]
    LineItem(#[from] LineItemError),

    /// Archive commit failed; nothing was deleted
    #[error("archive commit failed, no documents were deleted: {0}")]
    Archive(#[source] DurabilityError),

    /// Delete failed after the archive was committed
    #[error(
        "archive {} was committed but deleting {count} documents failed; \
         they remain in the store and will be archived again by the next run: {source}",
        .archive.display()
    )]
    Purge {
        /// Committed archive
        archive: PathBuf,
        /// Documents that were to be deleted
        count: usize,
        /// Underlying store error
        #[source]
        source: StoreError,
    },
}

impl From<TransformError> for TransferErrorKind {
    fn from(e: TransformError) -> Self {
        match e {
            TransformError::Shape(e) => TransferErrorKind::Shape(e),
            TransformError::LineItem(e) => TransferErrorKind::LineItem(e),
        }
    }
}

impl TransferErrorKind {
    /// Outcome category of this cause
    pub fn class(&self) -> ErrorClass {
        match self {
            TransferErrorKind::Blocked(_) => ErrorClass::Precondition,
            TransferErrorKind::Lock(e) if e.is_blocked() => ErrorClass::Precondition,
            TransferErrorKind::Lock(_) | TransferErrorKind::LockLocation(_) => ErrorClass::Archive,
            TransferErrorKind::Fetch { .. } => ErrorClass::Store,
            TransferErrorKind::Shape(_) | TransferErrorKind::LineItem(_) => ErrorClass::Shape,
            TransferErrorKind::Archive(_) => ErrorClass::Archive,
            TransferErrorKind::Purge { .. } => ErrorClass::Purge,
        }
    }
}

/// A transfer that stopped before `Done`
///
/// `state` is the last state the run reached; the failing step is the
/// transition out of it. `report` holds what the run had done by then
/// with its final state set to [`TransferState::Aborted`].
#[derive(Debug, Error)]
#[error("transfer {transfer_id} aborted after '{state}': {kind}")]
pub struct TransferError {
    /// Run identifier
    pub transfer_id: TransferId,
    /// Last state reached before the failure
    pub state: TransferState,
    /// Cause
    #[source]
    pub kind: TransferErrorKind,
    /// Partial report of the aborted run
    pub report: Box<TransferReport>,
}

impl TransferError {
    /// Abort a run that last reached `state`, marking `report` aborted
    pub fn new(state: TransferState, kind: TransferErrorKind, mut report: TransferReport) -> Self {
        report.final_state = TransferState::Aborted;
        Self {
            transfer_id: report.transfer_id,
            state,
            kind,
            report: Box::new(report),
        }
    }

    /// Outcome category of the failure
    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    /// Process exit code for the failure
    pub fn exit_code(&self) -> i32 {
        self.class().exit_code()
    }

    /// Check if the run was refused before taking the lock or touching the store
    pub fn is_precondition(&self) -> bool {
        self.class() == ErrorClass::Precondition
    }

    /// Check if the archive exists while its source documents remain
    pub fn is_duplication_risk(&self) -> bool {
        matches!(self.kind, TransferErrorKind::Purge { .. })
    }
}

/// Result type for transfers
pub type TransferResult<T> = std::result::Result<T, TransferError>;
