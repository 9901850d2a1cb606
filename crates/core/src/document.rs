//! Raw store documents
//!
//! A [`Document`] is what a store returns from a fetch: a reference that
//! addresses it for deletion plus a string-keyed map of typed field values.
//! The typed accessors (`string_field`, `timestamp_field`, `array_field`)
//! are the only way the transformer reads a document; they return a
//! [`ShapeError`] instead of asserting on the field type.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

/// Opaque reference to a stored document
///
/// For Firestore this is the full resource name
/// (`projects/<p>/databases/(default)/documents/orders/<id>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentRef(String);

impl DocumentRef {
    /// Create a reference from a store-specific name
    pub fn new(name: impl Into<String>) -> Self {
        DocumentRef(name.into())
    }

    /// The store-specific name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment of the name (the document id)
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed document field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicit null
    Null,
    /// Boolean
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit float
    Double(f64),
    /// Point in time
    Timestamp(DateTime<Utc>),
    /// UTF-8 string
    String(String),
    /// Ordered list of values
    Array(Vec<FieldValue>),
    /// Nested map
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Name of the value's type, used in shape error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Double(_) => "double",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::String(_) => "string",
            FieldValue::Array(_) => "array",
            FieldValue::Map(_) => "map",
        }
    }

    /// String content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamp content, if this is a timestamp
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Array content, if this is an array
    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(values) => Some(values),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(t)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Array(values.into_iter().map(Into::into).collect())
    }
}

/// A raw document fetched from a store
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    reference: DocumentRef,
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Create an empty document
    pub fn new(reference: DocumentRef) -> Self {
        Self {
            reference,
            fields: BTreeMap::new(),
        }
    }

    /// Create a document from an existing field map
    pub fn with_fields(reference: DocumentRef, fields: BTreeMap<String, FieldValue>) -> Self {
        Self { reference, fields }
    }

    /// Builder-style field insertion
    ///
    /// ```
    /// use orderarchive_core::{Document, DocumentRef};
    ///
    /// let doc = Document::new(DocumentRef::new("orders/a"))
    ///     .field("uid", "u1")
    ///     .field("products", Vec::<String>::new());
    /// assert_eq!(doc.string_field("uid").unwrap(), "u1");
    /// ```
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Reference addressing this document in its store
    pub fn reference(&self) -> &DocumentRef {
        &self.reference
    }

    /// All fields
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Raw field lookup
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    fn required(&self, name: &str) -> Result<&FieldValue, ShapeError> {
        self.fields.get(name).ok_or_else(|| ShapeError::MissingField {
            document: self.reference.clone(),
            field: name.to_string(),
        })
    }

    fn wrong_type(&self, name: &str, expected: &'static str, actual: &FieldValue) -> ShapeError {
        ShapeError::WrongType {
            document: self.reference.clone(),
            field: name.to_string(),
            expected,
            actual: actual.type_name(),
        }
    }

    /// Required string field
    pub fn string_field(&self, name: &str) -> Result<&str, ShapeError> {
        let value = self.required(name)?;
        value
            .as_str()
            .ok_or_else(|| self.wrong_type(name, "string", value))
    }

    /// Required timestamp field
    pub fn timestamp_field(&self, name: &str) -> Result<DateTime<Utc>, ShapeError> {
        let value = self.required(name)?;
        value
            .as_timestamp()
            .ok_or_else(|| self.wrong_type(name, "timestamp", value))
    }

    /// Required array field
    pub fn array_field(&self, name: &str) -> Result<&[FieldValue], ShapeError> {
        let value = self.required(name)?;
        value
            .as_array()
            .ok_or_else(|| self.wrong_type(name, "array", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc() -> Document {
        Document::new(DocumentRef::new("projects/p/databases/(default)/documents/orders/abc"))
    }

    #[test]
    fn test_document_ref_id() {
        let r = DocumentRef::new("projects/p/databases/(default)/documents/orders/abc");
        assert_eq!(r.id(), "abc");
        assert_eq!(DocumentRef::new("plain").id(), "plain");
    }

    #[test]
    fn test_string_field() {
        let d = doc().field("uid", "u1");
        assert_eq!(d.string_field("uid").unwrap(), "u1");
    }

    #[test]
    fn test_missing_field_names_document_and_field() {
        let err = doc().string_field("uid").unwrap_err();
        match &err {
            ShapeError::MissingField { document, field } => {
                assert_eq!(document.id(), "abc");
                assert_eq!(field, "uid");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
        assert!(err.to_string().contains("uid"));
    }

    #[test]
    fn test_wrong_type_reports_expected_and_actual() {
        let d = doc().field("date", "2024-01-01");
        let err = d.timestamp_field("date").unwrap_err();
        assert_eq!(
            err,
            ShapeError::WrongType {
                document: d.reference().clone(),
                field: "date".to_string(),
                expected: "timestamp",
                actual: "string",
            }
        );
    }

    #[test]
    fn test_timestamp_field() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let d = doc().field("date", t);
        assert_eq!(d.timestamp_field("date").unwrap(), t);
    }

    #[test]
    fn test_array_field() {
        let d = doc().field("products", vec!["a", "b"]);
        let values = d.array_field("products").unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].as_str(), Some("a"));

        let not_array = doc().field("products", 7i64);
        assert!(matches!(
            not_array.array_field("products"),
            Err(ShapeError::WrongType { actual: "integer", .. })
        ));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FieldValue::Null.type_name(), "null");
        assert_eq!(FieldValue::Boolean(true).type_name(), "boolean");
        assert_eq!(FieldValue::Double(1.0).type_name(), "double");
        assert_eq!(FieldValue::Map(BTreeMap::new()).type_name(), "map");
    }
}
