//! Atomic archive commit
//!
//! Protocol:
//! 1. serialize the full archive into memory
//! 2. create `<target>.tmp` as a new file, write, fsync
//! 3. rename the staging file onto the target (commit point)
//! 4. fsync the parent directory (best effort)

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use orderarchive_core::Archive;
use tracing::{debug, info, warn};

use super::format::{encode_archive, xxh3_hex};
use crate::error::{DurabilityError, DurabilityResult};
use crate::fs::Filesystem;
use crate::safety::staging_path;

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveCommitInfo {
    /// Committed archive path
    pub path: PathBuf,
    /// Number of orders written
    pub order_count: usize,
    /// Number of products written
    pub product_count: usize,
    /// Size of the archive in bytes
    pub bytes: u64,
    /// xxh3 checksum of the archive bytes
    pub checksum: String,
}

/// Writes archives through the staging-file + rename protocol
pub struct ArchiveWriter {
    fs: Arc<dyn Filesystem>,
}

impl ArchiveWriter {
    /// Create a writer over a filesystem
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs }
    }

    /// Serialize `archive` and atomically commit it at `target`
    ///
    /// Either `target` ends up holding the complete archive or it is left
    /// untouched. On a handled failure the staging file is removed again; a
    /// crash may leave it behind, which blocks the next run's safety check.
    pub fn commit(&self, archive: &Archive, target: &Path) -> DurabilityResult<ArchiveCommitInfo> {
        let bytes = encode_archive(archive)?;
        let staging = staging_path(target);

        if let Err(e) = self.fs.create_new(&staging, &bytes) {
            // AlreadyExists means the file is not ours to clean up
            if e.kind() != io::ErrorKind::AlreadyExists {
                self.discard_staging(&staging);
            }
            return Err(DurabilityError::io("write staging file", staging, e));
        }
        debug!(
            "Wrote {} bytes to staging file {}",
            bytes.len(),
            staging.display()
        );

        if let Err(e) = self.fs.rename(&staging, target) {
            self.discard_staging(&staging);
            return Err(DurabilityError::io("commit archive", target, e));
        }

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = self.fs.sync_dir(parent) {
                warn!("Failed to sync directory {}: {}", parent.display(), e);
            }
        }

        let info = ArchiveCommitInfo {
            path: target.to_path_buf(),
            order_count: archive.len(),
            product_count: archive.product_count(),
            bytes: bytes.len() as u64,
            checksum: xxh3_hex(&bytes),
        };
        info!(
            "Committed archive {} ({} orders, {} products, {} bytes, xxh3 {})",
            info.path.display(),
            info.order_count,
            info.product_count,
            info.bytes,
            info.checksum
        );
        Ok(info)
    }

    fn discard_staging(&self, staging: &Path) {
        if !self.fs.exists(staging).unwrap_or(false) {
            return;
        }
        if let Err(e) = self.fs.remove_file(staging) {
            warn!(
                "Failed to remove staging file {}: {}; remove it before the next run",
                staging.display(),
                e
            );
        }
    }
}
