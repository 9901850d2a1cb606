//! Transfer coordinator
//!
//! Drives one run through the pipeline, strictly in order:
//!
//! ```text
//! safety check ─► lock ─► fetch ─► transform ─► commit archive ─► delete fetched ─► unlock
//! ```
//!
//! Nothing is written before the safety check passes and the lock is held,
//! and nothing is deleted before the archive commit returns. The delete uses
//! the refs from this run's single fetch; the store is never re-queried.
//! Every exit path after acquisition releases the lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use orderarchive_core::{Document, DocumentRef, TransferId};
use orderarchive_durability::{ArchiveWriter, Filesystem, LocalFs, LockGuard, SafetyChecker};
use orderarchive_store::DocumentStore;
use tracing::{error, info, info_span};

use crate::error::{TransferError, TransferErrorKind, TransferResult};
use crate::options::MigrationOptions;
use crate::report::TransferReport;
use crate::state::TransferState;
use crate::transform::RecordTransformer;

struct Progress {
    state: TransferState,
    report: TransferReport,
}

impl Progress {
    fn advance(&mut self, next: TransferState) {
        debug_assert_eq!(self.state.next(), Some(next));
        self.state = next;
        self.report.final_state = next;

        let message = match next {
            TransferState::SafetyChecked => "Pre-flight checks passed",
            TransferState::Locked => "Lock acquired",
            TransferState::Fetched => "Fetched source documents",
            TransferState::Transformed => "Documents transformed",
            TransferState::Archived => "Archive committed",
            TransferState::Purged => "Source documents deleted",
            TransferState::Done => "Transfer complete",
            TransferState::Start | TransferState::Aborted => return,
        };
        info!(state = %next, "{}", message);
    }

    fn abort(self, kind: TransferErrorKind) -> TransferError {
        error!(state = %self.state, "Transfer aborted: {}", kind);
        TransferError::new(self.state, kind, self.report)
    }
}

/// Pre-flight checks of a run, without touching the store
///
/// Resolves the lock marker location and runs the [`SafetyChecker`] for
/// `options`. Returns the resolved lock path. Callers that need to set up
/// an expensive store client can run this first so a blocked run is
/// reported as blocked; [`TransferCoordinator::run`] repeats it.
pub fn preflight(
    fs: Arc<dyn Filesystem>,
    options: &MigrationOptions,
) -> Result<PathBuf, TransferErrorKind> {
    let lock_path = options
        .resolve_lock_path()
        .map_err(TransferErrorKind::LockLocation)?;
    SafetyChecker::new(fs, &lock_path).check(options.archive_path())?;
    Ok(lock_path)
}

/// Runs migrations from a [`DocumentStore`] into a local archive
pub struct TransferCoordinator<S> {
    store: S,
    fs: Arc<dyn Filesystem>,
    options: MigrationOptions,
}

impl<S: DocumentStore> TransferCoordinator<S> {
    /// Coordinator over `fs`
    pub fn new(store: S, fs: Arc<dyn Filesystem>, options: MigrationOptions) -> Self {
        Self { store, fs, options }
    }

    /// Coordinator over the real filesystem
    pub fn local(store: S, options: MigrationOptions) -> Self {
        Self::new(store, Arc::new(LocalFs::new()), options)
    }

    /// Options of this coordinator
    pub fn options(&self) -> &MigrationOptions {
        &self.options
    }

    /// Source store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one transfer
    ///
    /// On error the returned [`TransferError`] carries the last state the
    /// run reached and the partial report, now in
    /// [`TransferState::Aborted`]. The lock marker is gone by the time this returns unless
    /// acquiring it was what failed.
    pub fn run(&self) -> TransferResult<TransferReport> {
        let transfer_id = TransferId::new();
        let span = info_span!("transfer", id = %transfer_id);
        let _entered = span.enter();

        let started = Instant::now();
        let mut progress = Progress {
            state: TransferState::Start,
            report: TransferReport::new(transfer_id),
        };
        info!(
            archive = %self.options.archive_path().display(),
            store = %self.store.describe(),
            policy = %self.options.line_item_policy,
            dry_run = self.options.dry_run,
            "Starting transfer"
        );

        match self.execute(&mut progress) {
            Ok(()) => {
                let mut report = progress.report;
                report.elapsed = started.elapsed();
                info!("{}", report.summary());
                Ok(report)
            }
            Err(kind) => {
                progress.report.elapsed = started.elapsed();
                Err(progress.abort(kind))
            }
        }
    }

    fn execute(&self, progress: &mut Progress) -> Result<(), TransferErrorKind> {
        let archive_path = self.options.archive_path();
        let lock_path = preflight(Arc::clone(&self.fs), &self.options)?;
        progress.advance(TransferState::SafetyChecked);

        let guard =
            LockGuard::acquire(Arc::clone(&self.fs), &lock_path).map_err(TransferErrorKind::Lock)?;
        progress.advance(TransferState::Locked);

        let result = self.execute_locked(progress, archive_path);
        guard.release();
        result?;

        if !self.options.dry_run {
            progress.advance(TransferState::Done);
        }
        Ok(())
    }

    fn execute_locked(
        &self,
        progress: &mut Progress,
        archive_path: &Path,
    ) -> Result<(), TransferErrorKind> {
        let documents = self
            .store
            .fetch_all()
            .map_err(|source| TransferErrorKind::Fetch {
                store: self.store.describe(),
                source,
            })?;
        progress.report.fetched = documents.len();
        progress.advance(TransferState::Fetched);

        let output = RecordTransformer::new(self.options.line_item_policy).transform(&documents)?;
        progress.report.issues = output.issues;
        progress.advance(TransferState::Transformed);

        if self.options.dry_run {
            info!(
                orders = output.archive.len(),
                "Dry run: archive not written, nothing deleted"
            );
            return Ok(());
        }

        let info = ArchiveWriter::new(Arc::clone(&self.fs))
            .commit(&output.archive, archive_path)
            .map_err(TransferErrorKind::Archive)?;
        progress.report.archived = info.order_count;
        progress.report.commit = Some(info);
        progress.advance(TransferState::Archived);

        let refs = fetched_refs(&documents);
        self.store
            .delete_batch(&refs)
            .map_err(|source| TransferErrorKind::Purge {
                archive: archive_path.to_path_buf(),
                count: refs.len(),
                source,
            })?;
        progress.report.deleted = refs.len();
        progress.advance(TransferState::Purged);
        Ok(())
    }
}

fn fetched_refs(documents: &[Document]) -> Vec<DocumentRef> {
    documents.iter().map(|d| d.reference().clone()).collect()
}
