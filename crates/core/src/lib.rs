//! Core types for orderarchive
//!
//! This crate defines the data shared by every layer of the migration:
//! - [`Order`] / [`Product`]: the archive's unit of transfer
//! - [`Archive`]: the full, ordered record set written in one commit
//! - [`Document`] / [`FieldValue`]: raw documents as returned by a store
//! - [`ShapeError`] / [`LineItemError`]: document validation failures
//! - [`TransferId`]: identifier for a single migration run

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod types;

pub use document::{Document, DocumentRef, FieldValue};
pub use error::{LineItemError, ShapeError};
pub use types::{Archive, Order, Product, TransferId};
