//! Order types for the archive
//!
//! This module defines the records that flow from the store into the archive:
//! - [`Product`]: one line item of an order
//! - [`Order`]: an order with its line items
//! - [`Archive`]: the ordered set of orders committed by a single run
//! - [`TransferId`]: unique identifier for a migration run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a migration run
///
/// Every run of the transfer coordinator gets a fresh TransferId. It is
/// attached to the `transfer` tracing span and to the final report so log
/// lines from one run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(Uuid);

impl TransferId {
    /// Create a new random TransferId using UUID v4
    ///
    /// # Examples
    ///
    /// ```
    /// use orderarchive_core::TransferId;
    ///
    /// let id1 = TransferId::new();
    /// let id2 = TransferId::new();
    /// assert_ne!(id1, id2);
    /// ```
    pub fn new() -> Self {
        TransferId(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single line item of an order
///
/// In the store every line item is an independently JSON-encoded string:
///
/// ```json
/// {"id": "p1", "amount": 3}
/// ```
///
/// A field missing from the payload takes its zero value, so `{"id":"p1"}`
/// decodes as `p1` with amount 0. Unknown fields are ignored. `amount` is
/// passed through unvalidated; zero and negative quantities are legal. Only
/// payloads that are not JSON objects or carry mistyped fields fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    /// Item identifier
    #[serde(default)]
    pub id: String,
    /// Quantity
    #[serde(default)]
    pub amount: i64,
}

impl Product {
    /// Create a new product
    pub fn new(id: impl Into<String>, amount: i64) -> Self {
        Self {
            id: id.into(),
            amount,
        }
    }

    /// Decode a product from its JSON-encoded store payload
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// The zero-valued product substituted for undecodable payloads
    /// under the zero-value line item policy
    pub fn zeroed() -> Self {
        Self {
            id: String::new(),
            amount: 0,
        }
    }
}

/// An order as written to the archive
///
/// Orders are immutable once constructed: the fields are only reachable
/// through accessors. An order with no products is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    uid: String,
    date: DateTime<Utc>,
    products: Vec<Product>,
}

impl Order {
    /// Create a new order
    ///
    /// `uid` is an opaque owner/session token and is not validated.
    pub fn new(uid: impl Into<String>, date: DateTime<Utc>, products: Vec<Product>) -> Self {
        Self {
            uid: uid.into(),
            date,
            products,
        }
    }

    /// External identifier
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Creation timestamp assigned by the store
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Line items in source order
    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

/// The full record set of one migration run
///
/// Built once in memory, serialized once and committed once. Order is the
/// fetch order of the store; the archive never re-sorts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    orders: Vec<Order>,
}

impl Archive {
    /// Create an archive from orders
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    /// Orders in archive order
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Number of orders
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if the archive holds no orders
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Total number of products across all orders
    pub fn product_count(&self) -> usize {
        self.orders.iter().map(|o| o.products.len()).sum()
    }

    /// Consume the archive, returning its orders
    pub fn into_orders(self) -> Vec<Order> {
        self.orders
    }
}

impl From<Vec<Order>> for Archive {
    fn from(orders: Vec<Order>) -> Self {
        Self::new(orders)
    }
}
