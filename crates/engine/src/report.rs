//! Run report

use std::time::Duration;

use orderarchive_core::{LineItemError, TransferId};
use orderarchive_durability::ArchiveCommitInfo;

use crate::state::TransferState;

/// Outcome of a run
///
/// Returned on success, and carried by
/// [`TransferError`](crate::TransferError) for a run that aborted.
#[derive(Debug, Clone)]
pub struct TransferReport {
    /// Run identifier
    pub transfer_id: TransferId,
    /// `Done`, `Transformed` for a dry run, or `Aborted`
    pub final_state: TransferState,
    /// Documents returned by the fetch
    pub fetched: usize,
    /// Orders written to the archive
    pub archived: usize,
    /// Documents deleted from the store
    pub deleted: usize,
    /// Line items that were skipped or zeroed
    pub issues: Vec<LineItemError>,
    /// Set once the archive is committed
    pub commit: Option<ArchiveCommitInfo>,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl TransferReport {
    pub(crate) fn new(transfer_id: TransferId) -> Self {
        Self {
            transfer_id,
            final_state: TransferState::Start,
            fetched: 0,
            archived: 0,
            deleted: 0,
            issues: Vec::new(),
            commit: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Check if any line item was not archived as stored
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Check if the run stopped after the transform by request
    pub fn is_dry_run(&self) -> bool {
        self.final_state == TransferState::Transformed
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        let target = match &self.commit {
            Some(info) => format!(
                "{} ({} bytes, xxh3 {})",
                info.path.display(),
                info.bytes,
                info.checksum
            ),
            None => "no archive written".to_string(),
        };

        format!(
            "Transfer {} {}: {} fetched, {} archived, {} deleted, {} line item issues, {:.2}ms, {}",
            self.transfer_id,
            self.final_state,
            self.fetched,
            self.archived,
            self.deleted,
            self.issues.len(),
            self.elapsed.as_secs_f64() * 1000.0,
            target
        )
    }
}
