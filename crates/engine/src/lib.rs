//! Transfer engine for orderarchive
//!
//! Moves every order document from a [`DocumentStore`] into one local XML
//! archive and then removes exactly those documents from the store.
//!
//! - [`TransferCoordinator`]: runs the pipeline as a linear state machine
//!   ([`TransferState`]) and returns a [`TransferReport`] or a
//!   [`TransferError`]
//! - [`RecordTransformer`]: validates documents and decodes line items
//! - [`MigrationOptions`]: archive path, lock location, line item policy
//!
//! ## Guarantees
//!
//! - at-least-once delivery into the archive: sources are only deleted
//!   after the archive commit returns
//! - at-most-once deletion: one delete call, with the refs of one fetch
//! - single instance: a lock marker is held for the whole run
//!
//! [`DocumentStore`]: orderarchive_store::DocumentStore

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod error;
pub mod options;
pub mod report;
pub mod state;
pub mod transform;

pub use coordinator::{preflight, TransferCoordinator};
pub use error::{ErrorClass, TransferError, TransferErrorKind, TransferResult};
pub use options::{LineItemPolicy, MigrationOptions, ParsePolicyError};
pub use report::TransferReport;
pub use state::TransferState;
pub use transform::{RecordTransformer, TransformError, TransformOutput};
