//! Filesystem capability
//!
//! The lock guard, safety checker and archive writer never call `std::fs`
//! directly; they go through [`Filesystem`] so tests can simulate another
//! process holding the lock, a crash between staging write and rename, or an
//! I/O failure at any step, without real processes or a real disk.
//!
//! - [`LocalFs`]: the real filesystem
//! - [`MemoryFs`]: in-memory map with per-path failure injection

mod local;
mod memory;

pub use local::LocalFs;
pub use memory::{FsOp, MemoryFs};

use std::io;
use std::path::Path;

/// Minimal set of filesystem operations used by the durability layer
pub trait Filesystem: Send + Sync {
    /// Check whether anything exists at `path` (symlinks are not followed)
    ///
    /// `Ok(false)` only when the path is definitely absent.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Create `path` as a new file, write `contents` and flush to stable storage
    ///
    /// Fails with `AlreadyExists` if the path is present. If the write fails
    /// after creation the partial file may remain.
    fn create_new(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Read the full contents of a file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Atomically replace `to` with `from`
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Flush directory metadata (renames, creations) to stable storage
    fn sync_dir(&self, _dir: &Path) -> io::Result<()> {
        Ok(())
    }
}
