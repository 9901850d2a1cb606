//! Durability layer for orderarchive
//!
//! This crate owns everything that touches the local filesystem:
//! - [`Filesystem`]: injectable filesystem capability ([`LocalFs`], [`MemoryFs`])
//! - [`LockGuard`]: scoped single-instance lock marker (`.pid` file)
//! - [`SafetyChecker`]: read-only pre-flight checks before any mutation
//! - [`ArchiveWriter`] / [`ArchiveReader`]: XML archive with atomic commit
//!
//! ## Commit protocol
//!
//! ```text
//! serialize ──► <archive>.tmp (create_new + fsync) ──► rename ──► <archive>
//!                                                        ▲
//!                                                  single commit point
//! ```
//!
//! A crash before the rename leaves only the staging file, which the
//! [`SafetyChecker`] reports on the next run. A crash after it leaves a
//! complete archive.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod error;
pub mod fs;
pub mod lock;
pub mod safety;

pub use archive::{
    decode_archive, encode_archive, xxh3_hex, ArchiveCommitInfo, ArchiveReader, ArchiveWriter,
};
pub use error::{DurabilityError, DurabilityResult};
pub use fs::{Filesystem, FsOp, LocalFs, MemoryFs};
pub use lock::{default_lock_path, read_lock_holder, LockGuard, LOCK_FILE_NAME};
pub use safety::{staging_path, SafetyChecker, SafetyViolation, STAGING_SUFFIX};
