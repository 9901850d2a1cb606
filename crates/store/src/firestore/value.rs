//! Firestore REST value decoding
//!
//! Every REST value is a single-key object naming its type:
//!
//! ```json
//! {"stringValue": "u1"}
//! {"integerValue": "3"}
//! {"timestampValue": "2024-01-01T00:00:00Z"}
//! {"arrayValue": {"values": [{"stringValue": "..."}]}}
//! ```
//!
//! Integers travel as strings. An empty `arrayValue` / `mapValue` object
//! omits its `values` / `fields` member.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use orderarchive_core::{Document, DocumentRef, FieldValue};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

const OPERATION: &str = "decode document";

fn malformed(message: impl Into<String>) -> StoreError {
    StoreError::decode(OPERATION, message)
}

/// Decode one REST value
pub fn decode_value(raw: &Value) -> StoreResult<FieldValue> {
    let object = raw
        .as_object()
        .ok_or_else(|| malformed(format!("value is not an object: {}", raw)))?;
    let (kind, inner) = match object.iter().next() {
        Some(entry) if object.len() == 1 => entry,
        _ => return Err(malformed(format!("value must have exactly one type key: {}", raw))),
    };

    match kind.as_str() {
        "nullValue" => Ok(FieldValue::Null),
        "booleanValue" => inner
            .as_bool()
            .map(FieldValue::Boolean)
            .ok_or_else(|| malformed("booleanValue is not a boolean")),
        "integerValue" => decode_integer(inner).map(FieldValue::Integer),
        "doubleValue" => decode_double(inner).map(FieldValue::Double),
        "timestampValue" => {
            let text = inner
                .as_str()
                .ok_or_else(|| malformed("timestampValue is not a string"))?;
            DateTime::parse_from_rfc3339(text)
                .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc)))
                .map_err(|e| malformed(format!("invalid timestampValue '{}': {}", text, e)))
        }
        "stringValue" | "bytesValue" | "referenceValue" => inner
            .as_str()
            .map(|s| FieldValue::String(s.to_string()))
            .ok_or_else(|| malformed(format!("{} is not a string", kind))),
        "geoPointValue" => {
            let point = inner
                .as_object()
                .ok_or_else(|| malformed("geoPointValue is not an object"))?;
            let mut fields = BTreeMap::new();
            for axis in ["latitude", "longitude"] {
                let v = point.get(axis).and_then(Value::as_f64).unwrap_or(0.0);
                fields.insert(axis.to_string(), FieldValue::Double(v));
            }
            Ok(FieldValue::Map(fields))
        }
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(items)) => items,
                Some(_) => return Err(malformed("arrayValue.values is not an array")),
                None => return Ok(FieldValue::Array(Vec::new())),
            };
            values
                .iter()
                .map(decode_value)
                .collect::<StoreResult<Vec<_>>>()
                .map(FieldValue::Array)
        }
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields).map(FieldValue::Map),
            Some(_) => Err(malformed("mapValue.fields is not an object")),
            None => Ok(FieldValue::Map(BTreeMap::new())),
        },
        other => Err(malformed(format!("unsupported value type '{}'", other))),
    }
}

fn decode_integer(inner: &Value) -> StoreResult<i64> {
    match inner {
        Value::String(s) => s
            .parse()
            .map_err(|_| malformed(format!("integerValue '{}' is not an integer", s))),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| malformed(format!("integerValue {} out of range", n))),
        _ => Err(malformed("integerValue is not a string or number")),
    }
}

fn decode_double(inner: &Value) -> StoreResult<f64> {
    match inner {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| malformed(format!("doubleValue {} is not a float", n))),
        // NaN and infinities are sent as strings
        Value::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(malformed(format!("doubleValue '{}' is not a float", s))),
        },
        _ => Err(malformed("doubleValue is not a number")),
    }
}

fn decode_fields(fields: &Map<String, Value>) -> StoreResult<BTreeMap<String, FieldValue>> {
    fields
        .iter()
        .map(|(name, raw)| decode_value(raw).map(|v| (name.clone(), v)))
        .collect()
}

/// Decode a REST document (`{"name": ..., "fields": {...}}`)
pub fn decode_document(raw: &Value) -> StoreResult<Document> {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("document has no name"))?;
    let fields = match raw.get("fields") {
        Some(Value::Object(fields)) => decode_fields(fields)?,
        Some(_) => return Err(malformed(format!("{}: fields is not an object", name))),
        None => BTreeMap::new(),
    };
    Ok(Document::with_fields(DocumentRef::new(name), fields))
}
