//! Document → order conversion
//!
//! Required document fields:
//!
//! | Field      | Type              |
//! |------------|-------------------|
//! | `uid`      | string            |
//! | `date`     | timestamp         |
//! | `products` | array of strings  |
//!
//! Each `products` element is a JSON-encoded line item
//! (`{"id":"p1","amount":3}`); a line item field that is absent takes its
//! zero value. A document field that is missing or mistyped fails the whole
//! transform; a line item that does not decode is handled per
//! [`LineItemPolicy`].

use orderarchive_core::{Archive, Document, LineItemError, Order, Product, ShapeError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::options::LineItemPolicy;

pub(crate) const UID_FIELD: &str = "uid";
pub(crate) const DATE_FIELD: &str = "date";
pub(crate) const PRODUCTS_FIELD: &str = "products";

/// Fatal transform failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Required field missing or mistyped
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Undecodable line item under [`LineItemPolicy::Fail`]
    #[error(transparent)]
    LineItem(#[from] LineItemError),
}

/// Orders built from a fetch, plus every tolerated line item failure
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    /// Orders in fetch order
    pub archive: Archive,
    /// Line items dropped or zeroed under a tolerant policy
    pub issues: Vec<LineItemError>,
}

/// Converts store documents into archive orders
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordTransformer {
    policy: LineItemPolicy,
}

impl RecordTransformer {
    /// Create a transformer applying `policy` to undecodable line items
    pub fn new(policy: LineItemPolicy) -> Self {
        Self { policy }
    }

    /// Line item policy in effect
    pub fn policy(&self) -> LineItemPolicy {
        self.policy
    }

    /// Convert every document, preserving input order
    pub fn transform(&self, documents: &[Document]) -> Result<TransformOutput, TransformError> {
        let mut issues = Vec::new();
        let orders = documents
            .iter()
            .map(|doc| self.transform_one(doc, &mut issues))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(orders = orders.len(), issues = issues.len(), "Transformed documents");
        Ok(TransformOutput {
            archive: Archive::new(orders),
            issues,
        })
    }

    fn transform_one(
        &self,
        doc: &Document,
        issues: &mut Vec<LineItemError>,
    ) -> Result<Order, TransformError> {
        let uid = doc.string_field(UID_FIELD)?;
        let date = doc.timestamp_field(DATE_FIELD)?;
        let encoded = doc.array_field(PRODUCTS_FIELD)?;

        let mut products = Vec::with_capacity(encoded.len());
        for (index, value) in encoded.iter().enumerate() {
            let payload = value.as_str().ok_or_else(|| ShapeError::WrongType {
                document: doc.reference().clone(),
                field: format!("{}[{}]", PRODUCTS_FIELD, index),
                expected: "string",
                actual: value.type_name(),
            })?;

            match Product::from_json(payload) {
                Ok(product) => products.push(product),
                Err(e) => {
                    let issue = LineItemError {
                        document: doc.reference().clone(),
                        index,
                        reason: e.to_string(),
                        payload: payload.to_string(),
                    };
                    match self.policy {
                        LineItemPolicy::Fail => return Err(issue.into()),
                        LineItemPolicy::ZeroValue => {
                            warn!("{}; keeping an empty product", issue);
                            products.push(Product::zeroed());
                        }
                        LineItemPolicy::Skip => {
                            warn!("{}; skipping", issue);
                        }
                    }
                    issues.push(issue);
                }
            }
        }

        Ok(Order::new(uid, date, products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use orderarchive_core::{DocumentRef, FieldValue};

    fn order_doc(id: &str, uid: &str, day: u32, products: Vec<&str>) -> Document {
        Document::new(DocumentRef::new(format!("orders/{}", id)))
            .field("uid", uid)
            .field("date", Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap())
            .field("products", products)
    }

    #[test]
    fn test_transform_preserves_order_and_length() {
        let docs = vec![
            order_doc("B", "u2", 2, vec![]),
            order_doc("A", "u1", 1, vec![r#"{"id":"p1","amount":3}"#]),
        ];
        let out = RecordTransformer::default().transform(&docs).unwrap();

        let orders = out.archive.orders();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].uid(), "u2");
        assert!(orders[0].products().is_empty());
        assert_eq!(orders[1].products(), &[Product::new("p1", 3)]);
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_negative_and_zero_amounts_pass_through() {
        let docs = vec![order_doc(
            "A",
            "u1",
            1,
            vec![r#"{"id":"p1","amount":0}"#, r#"{"id":"p2","amount":-5}"#],
        )];
        let out = RecordTransformer::default().transform(&docs).unwrap();
        assert_eq!(
            out.archive.orders()[0].products(),
            &[Product::new("p1", 0), Product::new("p2", -5)]
        );
    }

    #[test]
    fn test_missing_uid_is_fatal() {
        let doc = Document::new(DocumentRef::new("orders/X"))
            .field("date", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .field("products", Vec::<&str>::new());

        let err = RecordTransformer::default().transform(&[doc]).unwrap_err();
        match err {
            TransformError::Shape(ShapeError::MissingField { document, field }) => {
                assert_eq!(document.as_str(), "orders/X");
                assert_eq!(field, "uid");
            }
            other => panic!("Expected missing uid, got {:?}", other),
        }
    }

    #[test]
    fn test_mistyped_date_is_fatal() {
        let doc = order_doc("A", "u1", 1, vec![]).field("date", "2024-01-01");
        let err = RecordTransformer::default().transform(&[doc]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::Shape(ShapeError::WrongType { expected: "timestamp", .. })
        ));
    }

    #[test]
    fn test_missing_products_is_fatal() {
        let doc = Document::new(DocumentRef::new("orders/A"))
            .field("uid", "u1")
            .field("date", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(RecordTransformer::default().transform(&[doc]).is_err());
    }

    #[test]
    fn test_non_string_product_element_is_fatal() {
        let doc = order_doc("A", "u1", 1, vec![])
            .field("products", FieldValue::Array(vec![FieldValue::Integer(7)]));
        let err = RecordTransformer::new(LineItemPolicy::ZeroValue)
            .transform(&[doc])
            .unwrap_err();
        assert!(err.to_string().contains("products[0]"));
    }

    #[test]
    fn test_skip_policy_drops_and_reports() {
        let docs = vec![order_doc(
            "A",
            "u1",
            1,
            vec!["not json", r#"{"id":"p2","amount":1}"#],
        )];
        let out = RecordTransformer::new(LineItemPolicy::Skip)
            .transform(&docs)
            .unwrap();

        assert_eq!(out.archive.orders()[0].products(), &[Product::new("p2", 1)]);
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].index, 0);
        assert_eq!(out.issues[0].document.as_str(), "orders/A");
        assert_eq!(out.issues[0].payload, "not json");
    }

    #[test]
    fn test_line_item_without_amount_is_kept_with_zero_amount() {
        let docs = vec![order_doc("A", "u1", 1, vec![r#"{"id":"p1"}"#])];
        for policy in LineItemPolicy::ALL {
            let out = RecordTransformer::new(policy).transform(&docs).unwrap();
            assert_eq!(out.archive.orders()[0].products(), &[Product::new("p1", 0)]);
            assert!(out.issues.is_empty());
        }
    }

    #[test]
    fn test_zero_value_policy_keeps_position() {
        let docs = vec![order_doc(
            "A",
            "u1",
            1,
            vec![r#"{"id":"p1","amount":2}"#, r#"{"id":"p2","amount":"two"}"#],
        )];
        let out = RecordTransformer::new(LineItemPolicy::ZeroValue)
            .transform(&docs)
            .unwrap();

        assert_eq!(
            out.archive.orders()[0].products(),
            &[Product::new("p1", 2), Product::zeroed()]
        );
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].index, 1);
        assert_eq!(out.issues[0].payload, r#"{"id":"p2","amount":"two"}"#);
    }

    #[test]
    fn test_fail_policy_aborts() {
        let docs = vec![
            order_doc("A", "u1", 1, vec![]),
            order_doc("B", "u2", 2, vec!["{"]),
        ];
        let err = RecordTransformer::new(LineItemPolicy::Fail)
            .transform(&docs)
            .unwrap_err();
        match err {
            TransformError::LineItem(issue) => assert_eq!(issue.document.id(), "B"),
            other => panic!("Expected line item error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        let out = RecordTransformer::default().transform(&[]).unwrap();
        assert!(out.archive.is_empty());
    }
}
