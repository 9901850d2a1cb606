//! Pre-flight safety checks
//!
//! Before a run takes the lock or touches the store, the [`SafetyChecker`]
//! verifies, in order:
//!
//! 1. no staging file `<archive>.tmp` exists (an earlier write never committed)
//! 2. the archive itself does not exist (archives are never overwritten)
//! 3. no lock marker exists (another run is active, or a killed run left it)
//!
//! The first match wins. Checks are read-only, so running them repeatedly
//! against the same filesystem state always yields the same verdict.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::fs::Filesystem;
use crate::lock::read_lock_holder;

/// Suffix appended to the archive path to form the staging path
pub const STAGING_SUFFIX: &str = ".tmp";

/// Staging path for an archive target: the full path with `.tmp` appended
///
/// ```
/// use std::path::Path;
/// use orderarchive_durability::staging_path;
///
/// assert_eq!(
///     staging_path(Path::new("/data/orders.xml")),
///     Path::new("/data/orders.xml.tmp")
/// );
/// ```
pub fn staging_path(archive: &Path) -> PathBuf {
    let mut name = OsString::from(archive.as_os_str());
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

/// Reason a run may not proceed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SafetyViolation {
    /// An earlier archive write was interrupted before commit
    #[error("incomplete prior write detected: {} exists", .path.display())]
    StagingFilePresent {
        /// Staging file path
        path: PathBuf,
    },

    /// The archive target is already present
    #[error("archive already present at {}; refusing to overwrite", .path.display())]
    ArchiveExists {
        /// Archive path
        path: PathBuf,
    },

    /// A lock marker exists
    #[error("another run is active{}, check {}", holder_suffix(.holder), .path.display())]
    LockHeld {
        /// Lock marker path
        path: PathBuf,
        /// PID recorded in the marker, when readable
        holder: Option<u32>,
    },

    /// Existence of a path could not be determined
    #[error("cannot inspect {}: {kind}", .path.display())]
    Uninspectable {
        /// Path that failed to stat
        path: PathBuf,
        /// Underlying error kind
        kind: io::ErrorKind,
    },
}

fn holder_suffix(holder: &Option<u32>) -> String {
    match holder {
        Some(pid) => format!(" (pid {})", pid),
        None => String::new(),
    }
}

impl SafetyViolation {
    /// Path the violation refers to
    pub fn path(&self) -> &Path {
        match self {
            SafetyViolation::StagingFilePresent { path }
            | SafetyViolation::ArchiveExists { path }
            | SafetyViolation::LockHeld { path, .. }
            | SafetyViolation::Uninspectable { path, .. } => path,
        }
    }
}

/// Read-only pre-flight checker
pub struct SafetyChecker {
    fs: Arc<dyn Filesystem>,
    lock_path: PathBuf,
}

impl SafetyChecker {
    /// Create a checker for the given lock marker location
    pub fn new(fs: Arc<dyn Filesystem>, lock_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            lock_path: lock_path.into(),
        }
    }

    /// Lock marker path this checker inspects
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Verify that a run targeting `archive` may proceed
    pub fn check(&self, archive: &Path) -> Result<(), SafetyViolation> {
        let staging = staging_path(archive);
        if self.present(&staging)? {
            return Err(SafetyViolation::StagingFilePresent { path: staging });
        }

        if self.present(archive)? {
            return Err(SafetyViolation::ArchiveExists {
                path: archive.to_path_buf(),
            });
        }

        if self.present(&self.lock_path)? {
            return Err(SafetyViolation::LockHeld {
                path: self.lock_path.clone(),
                holder: read_lock_holder(self.fs.as_ref(), &self.lock_path),
            });
        }

        debug!("Safety check passed for {}", archive.display());
        Ok(())
    }

    fn present(&self, path: &Path) -> Result<bool, SafetyViolation> {
        self.fs
            .exists(path)
            .map_err(|e| SafetyViolation::Uninspectable {
                path: path.to_path_buf(),
                kind: e.kind(),
            })
    }
}
