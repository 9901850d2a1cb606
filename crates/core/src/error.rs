//! Document validation errors
//!
//! Two failure scopes exist when turning store documents into orders:
//! - [`ShapeError`]: a required document field is missing or mistyped.
//!   Fatal for the whole run.
//! - [`LineItemError`]: one encoded line item could not be decoded.
//!   Scoped to that item; how it is handled is a policy decision of the
//!   transformer.

use thiserror::Error;

use crate::document::DocumentRef;

/// A required document field is missing or has the wrong type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Required field absent
    #[error("document {document}: missing required field '{field}'")]
    MissingField {
        /// Offending document
        document: DocumentRef,
        /// Field name
        field: String,
    },

    /// Field present with an unexpected type
    #[error("document {document}: field '{field}' expected {expected}, got {actual}")]
    WrongType {
        /// Offending document
        document: DocumentRef,
        /// Field name (array elements use `field[index]`)
        field: String,
        /// Expected type name
        expected: &'static str,
        /// Actual type name
        actual: &'static str,
    },
}

impl ShapeError {
    /// Document the error refers to
    pub fn document(&self) -> &DocumentRef {
        match self {
            ShapeError::MissingField { document, .. } => document,
            ShapeError::WrongType { document, .. } => document,
        }
    }
}

/// A single encoded line item failed to decode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("document {document}: line item {index} could not be decoded: {reason} (payload {payload:?})")]
pub struct LineItemError {
    /// Document holding the line item
    pub document: DocumentRef,
    /// Position within the document's line item array
    pub index: usize,
    /// Decoder message
    pub reason: String,
    /// The undecodable payload as stored
    pub payload: String,
}
