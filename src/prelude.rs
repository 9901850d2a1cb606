//! Convenient imports for orderarchive.
//!
//! ```ignore
//! use orderarchive::prelude::*;
//! ```

// Entry points
pub use crate::migrate;
pub use crate::{Error, Result};

// Pipeline
pub use orderarchive_engine::{
    ErrorClass, LineItemPolicy, MigrationOptions, TransferCoordinator, TransferReport,
    TransferState,
};

// Stores
pub use orderarchive_store::{DocumentStore, FirestoreConfig, FirestoreStore, MemoryStore};

// Archive
pub use orderarchive_durability::{ArchiveReader, ArchiveWriter, Filesystem, LocalFs, MemoryFs};

// Core types
pub use orderarchive_core::{Archive, Document, DocumentRef, FieldValue, Order, Product};
