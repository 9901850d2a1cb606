use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::Filesystem;

/// Operation selector for [`MemoryFs::fail_on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOp {
    /// Existence checks
    Exists,
    /// `create_new` fails before anything is created
    CreateNew,
    /// `create_new` creates the file but fails writing it (partial write)
    Write,
    /// Reads
    Read,
    /// Renames, keyed by the source path
    Rename,
    /// Removals
    Remove,
}

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<PathBuf, Vec<u8>>,
    failures: HashMap<(FsOp, PathBuf), io::ErrorKind>,
}

/// In-memory filesystem with failure injection
///
/// Paths are compared literally. Directories are not modeled.
///
/// ```
/// use std::io::ErrorKind;
/// use std::path::Path;
/// use orderarchive_durability::{Filesystem, FsOp, MemoryFs};
///
/// let fs = MemoryFs::new();
/// fs.fail_on(FsOp::Rename, "/a.tmp", ErrorKind::PermissionDenied);
/// fs.create_new(Path::new("/a.tmp"), b"x").unwrap();
/// assert!(fs.rename(Path::new("/a.tmp"), Path::new("/a")).is_err());
/// ```
#[derive(Debug, Default)]
pub struct MemoryFs {
    state: Mutex<State>,
}

impl MemoryFs {
    /// Create an empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a file, overwriting any existing content
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.state.lock().files.insert(path.into(), contents.into());
    }

    /// Content of a file, if present
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.state.lock().files.get(path.as_ref()).cloned()
    }

    /// Check presence without going through failure injection
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.state.lock().files.contains_key(path.as_ref())
    }

    /// All present paths in sorted order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.state.lock().files.keys().cloned().collect()
    }

    /// Make every subsequent `op` on `path` fail with `kind`
    pub fn fail_on(&self, op: FsOp, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.state.lock().failures.insert((op, path.into()), kind);
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    fn injected(state: &State, op: FsOp, path: &Path) -> io::Result<()> {
        match state.failures.get(&(op, path.to_path_buf())) {
            Some(kind) => Err(io::Error::new(
                *kind,
                format!("injected {:?} failure on {}", op, path.display()),
            )),
            None => Ok(()),
        }
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )
    }
}

impl Filesystem for MemoryFs {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        let state = self.state.lock();
        Self::injected(&state, FsOp::Exists, path)?;
        Ok(state.files.contains_key(path))
    }

    fn create_new(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        Self::injected(&state, FsOp::CreateNew, path)?;
        if state.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            ));
        }
        if let Err(e) = Self::injected(&state, FsOp::Write, path) {
            let partial = contents[..contents.len() / 2].to_vec();
            state.files.insert(path.to_path_buf(), partial);
            return Err(e);
        }
        state.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let state = self.state.lock();
        Self::injected(&state, FsOp::Read, path)?;
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.state.lock();
        Self::injected(&state, FsOp::Rename, from)?;
        let contents = state
            .files
            .remove(from)
            .ok_or_else(|| Self::not_found(from))?;
        state.files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.lock();
        Self::injected(&state, FsOp::Remove, path)?;
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(path))
    }
}
