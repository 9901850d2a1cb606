//! Archive reader

use std::path::Path;
use std::sync::Arc;

use orderarchive_core::Archive;

use super::format::decode_archive;
use crate::error::{DurabilityError, DurabilityResult};
use crate::fs::Filesystem;

/// Reads committed archives back into memory
pub struct ArchiveReader {
    fs: Arc<dyn Filesystem>,
}

impl ArchiveReader {
    /// Create a reader over a filesystem
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs }
    }

    /// Read and parse the archive at `path`
    pub fn read(&self, path: &Path) -> DurabilityResult<Archive> {
        let bytes = self
            .fs
            .read(path)
            .map_err(|e| DurabilityError::io("read archive", path, e))?;
        decode_archive(&bytes)
    }
}
