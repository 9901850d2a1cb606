//! Cloud Firestore over REST
//!
//! Two endpoints of the v1 API are used:
//!
//! | Operation      | Endpoint                                        |
//! |----------------|-------------------------------------------------|
//! | `fetch_all`    | `POST {db}/documents:runQuery` (ordered by date) |
//! | `delete_batch` | `POST {db}/documents:commit` (one atomic write set) |
//!
//! Authentication uses a service-account key file: a signed RS256 JWT is
//! exchanged for an OAuth access token once per store. When an emulator host
//! is configured, requests go to `http://<host>/v1` with the emulator's
//! owner token and no key exchange happens.

mod client;
mod config;
mod credentials;
mod value;

pub use client::FirestoreStore;
pub use config::{Endpoint, FirestoreConfig, DEFAULT_COLLECTION, DEFAULT_ORDER_BY};
pub use credentials::{ServiceAccountKey, DATASTORE_SCOPE};
pub use value::{decode_document, decode_value};
