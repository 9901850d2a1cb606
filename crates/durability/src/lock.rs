//! Single-instance lock marker
//!
//! The marker is a `.pid` file next to the running executable holding the
//! owner's process id as decimal text. It is a process-level singleton for
//! the install, not a per-archive lock: two runs from the same install may
//! not overlap even when they target different archives.
//!
//! The lock is advisory. Cooperating runs see the marker during the safety
//! check, and [`LockGuard::acquire`] creates it exclusively so two runs that
//! both pass the check cannot both acquire. A marker left behind by a killed
//! process must be removed by an operator.
//!
//! [`LockGuard`] removes the marker on [`LockGuard::release`] or on drop,
//! whichever comes first.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{DurabilityError, DurabilityResult};
use crate::fs::Filesystem;
use crate::safety::SafetyViolation;

/// File name of the lock marker
pub const LOCK_FILE_NAME: &str = ".pid";

/// Default marker location: `<directory of the running executable>/.pid`
pub fn default_lock_path() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("executable path {} has no parent directory", exe.display()),
        )
    })?;
    Ok(dir.join(LOCK_FILE_NAME))
}

/// PID recorded in a lock marker, if the marker is present and well-formed
pub fn read_lock_holder(fs: &dyn Filesystem, path: &Path) -> Option<u32> {
    let raw = fs.read(path).ok()?;
    std::str::from_utf8(&raw).ok()?.trim().parse().ok()
}

/// A held lock marker
///
/// Dropping the guard removes the marker. Failures to remove it are logged
/// and never surfaced, so a successful transfer is never reported as failed
/// because of cleanup.
pub struct LockGuard {
    fs: Arc<dyn Filesystem>,
    path: PathBuf,
    pid: u32,
    released: bool,
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("path", &self.path)
            .field("pid", &self.pid)
            .field("released", &self.released)
            .finish()
    }
}

impl LockGuard {
    /// Write the current process id to `path`, failing if a marker exists
    pub fn acquire(fs: Arc<dyn Filesystem>, path: impl Into<PathBuf>) -> DurabilityResult<Self> {
        Self::acquire_as(fs, path, std::process::id())
    }

    /// Acquire on behalf of an explicit process id
    pub fn acquire_as(
        fs: Arc<dyn Filesystem>,
        path: impl Into<PathBuf>,
        pid: u32,
    ) -> DurabilityResult<Self> {
        let path = path.into();

        match fs.create_new(&path, pid.to_string().as_bytes()) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let holder = read_lock_holder(fs.as_ref(), &path);
                return Err(SafetyViolation::LockHeld { path, holder }.into());
            }
            Err(e) => {
                // A failed write may have left a partial marker behind
                match fs.remove_file(&path) {
                    Ok(()) => debug!("Removed partial lock marker {}", path.display()),
                    Err(re) if re.kind() == io::ErrorKind::NotFound => {}
                    Err(re) => warn!(
                        "Failed to remove partial lock marker {}: {}; remove it manually before the next run",
                        path.display(),
                        re
                    ),
                }
                return Err(DurabilityError::io("write lock marker", path, e));
            }
        }

        debug!("Acquired lock marker {} (pid {})", path.display(), pid);
        Ok(Self {
            fs,
            path,
            pid,
            released: false,
        })
    }

    /// Marker path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Process id written to the marker
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Remove the marker now
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match self.fs.remove_file(&self.path) {
            Ok(()) => debug!("Released lock marker {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove lock marker {}: {}; remove it manually before the next run",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}
