//! Document store clients for orderarchive
//!
//! The transfer coordinator talks to the remote store only through
//! [`DocumentStore`]: one snapshot fetch and one batched delete per run.
//!
//! - [`FirestoreStore`]: Cloud Firestore over the REST API (service-account
//!   credentials, or the local emulator)
//! - [`MemoryStore`]: in-process store with call recording and failure
//!   injection

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod firestore;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use firestore::{Endpoint, FirestoreConfig, FirestoreStore, ServiceAccountKey};
pub use memory::MemoryStore;
pub use traits::DocumentStore;
