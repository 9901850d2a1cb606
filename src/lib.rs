//! # orderarchive
//!
//! One-shot, crash-safe migration of order documents from a remote document
//! store into a local XML archive.
//!
//! A run fetches every order, writes them all to one archive through an
//! atomic staging-file + rename commit, and only then deletes exactly the
//! fetched documents from the store. A lock marker keeps runs from
//! overlapping, and a leftover staging file or existing archive blocks the
//! next run until an operator looks at it.
//!
//! ## Quick Start
//!
//! ```ignore
//! use orderarchive::prelude::*;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let store = FirestoreStore::from_credentials_file("key.json".as_ref(), |c| c)?;
//!     let report = orderarchive::migrate(store, MigrationOptions::new("orders.xml"))?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Crates
//!
//! - `orderarchive-core`: orders, products, documents, validation errors
//! - `orderarchive-durability`: filesystem capability, lock marker, safety
//!   checks, archive format and atomic writer
//! - `orderarchive-store`: [`DocumentStore`] trait, Firestore REST client,
//!   memory store
//! - `orderarchive-engine`: transformer and [`TransferCoordinator`]

#![warn(missing_docs)]

mod error;

pub mod prelude;

pub use error::{Error, Result};

pub use orderarchive_core::{Archive, Document, DocumentRef, FieldValue, Order, Product, TransferId};
pub use orderarchive_engine::{
    ErrorClass, LineItemPolicy, MigrationOptions, TransferCoordinator, TransferReport,
    TransferState,
};
pub use orderarchive_store::DocumentStore;

/// Run one migration from `store` into `options.archive_path` on the local
/// filesystem.
pub fn migrate<S: DocumentStore>(store: S, options: MigrationOptions) -> Result<TransferReport> {
    Ok(TransferCoordinator::local(store, options).run()?)
}
