use std::path::Path;

use orderarchive_core::{Document, DocumentRef};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::config::{Endpoint, FirestoreConfig};
use super::credentials::ServiceAccountKey;
use super::value::decode_document;
use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

const EMULATOR_TOKEN: &str = "owner";

const FETCH: &str = "fetch orders";
const DELETE: &str = "delete orders";

/// Firestore collection accessed over the v1 REST API
pub struct FirestoreStore {
    config: FirestoreConfig,
    key: ServiceAccountKey,
    agent: ureq::Agent,
    token: Mutex<Option<String>>,
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("config", &self.config)
            .field("project_id", &self.key.project_id)
            .finish()
    }
}

impl FirestoreStore {
    /// Create a store for `config`, authenticating with `key`
    pub fn new(config: FirestoreConfig, key: ServiceAccountKey) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            config,
            key,
            agent: builder.build(),
            token: Mutex::new(None),
        }
    }

    /// Load the key file at `path` and target its project
    ///
    /// `configure` adjusts the default config (collection, emulator, ...)
    /// before the store is built.
    pub fn from_credentials_file(
        path: &Path,
        configure: impl FnOnce(FirestoreConfig) -> FirestoreConfig,
    ) -> StoreResult<Self> {
        let key = ServiceAccountKey::from_file(path)?;
        let config = configure(FirestoreConfig::new(key.project_id.clone()));
        Ok(Self::new(config, key))
    }

    /// Connection options in use
    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn authorization(&self) -> StoreResult<String> {
        if let Endpoint::Emulator(_) = self.config.endpoint {
            return Ok(format!("Bearer {}", EMULATOR_TOKEN));
        }

        let mut cached = self.token.lock();
        if let Some(token) = cached.as_ref() {
            return Ok(format!("Bearer {}", token));
        }
        let token = self.key.fetch_access_token(&self.agent)?;
        let header = format!("Bearer {}", token);
        *cached = Some(token);
        Ok(header)
    }

    fn post(&self, operation: &str, url: &str, body: Value) -> StoreResult<Value> {
        let authorization = self.authorization()?;
        debug!(url = %url, "{}", operation);
        let response = self
            .agent
            .post(url)
            .set("Authorization", &authorization)
            .send_json(body)
            .map_err(|e| StoreError::from_ureq(operation, e))?;
        response
            .into_json()
            .map_err(|e| StoreError::decode(operation, e.to_string()))
    }
}

/// `structuredQuery` selecting the whole collection, newest first
pub(crate) fn run_query_body(config: &FirestoreConfig) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": config.collection }],
            "orderBy": [{
                "field": { "fieldPath": config.order_by },
                "direction": "DESCENDING"
            }]
        }
    })
}

/// Commit body deleting every ref in one write set
pub(crate) fn commit_body(refs: &[DocumentRef]) -> Value {
    let writes: Vec<Value> = refs
        .iter()
        .map(|r| json!({ "delete": r.as_str() }))
        .collect();
    json!({ "writes": writes })
}

/// Collect documents from a `runQuery` response stream
///
/// Entries without a `document` (progress markers, `readTime` only) are
/// skipped.
pub(crate) fn parse_query_response(response: &Value) -> StoreResult<Vec<Document>> {
    let entries = response
        .as_array()
        .ok_or_else(|| StoreError::decode(FETCH, "runQuery response is not an array"))?;

    let mut documents = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(error) = entry.get("error") {
            return Err(StoreError::decode(FETCH, format!("query error: {}", error)));
        }
        if let Some(raw) = entry.get("document") {
            documents.push(decode_document(raw)?);
        }
    }
    Ok(documents)
}

impl DocumentStore for FirestoreStore {
    fn fetch_all(&self) -> StoreResult<Vec<Document>> {
        let url = format!("{}/{}:runQuery", self.config.base_url(), self.config.documents_path());
        let response = self.post(FETCH, &url, run_query_body(&self.config))?;
        let documents = parse_query_response(&response)?;
        info!(
            collection = %self.config.collection,
            count = documents.len(),
            "Fetched documents"
        );
        Ok(documents)
    }

    fn delete_batch(&self, refs: &[DocumentRef]) -> StoreResult<()> {
        if refs.is_empty() {
            return Ok(());
        }
        let url = format!(
            "{}/{}/documents:commit",
            self.config.base_url(),
            self.config.database_path()
        );
        self.post(DELETE, &url, commit_body(refs))?;
        info!(count = refs.len(), "Deleted documents");
        Ok(())
    }

    fn describe(&self) -> String {
        self.config.collection_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn emulator_store() -> FirestoreStore {
        let key = ServiceAccountKey::from_json(r#"{"project_id":"shop"}"#).unwrap();
        FirestoreStore::new(FirestoreConfig::new("shop").emulator("localhost:8080"), key)
    }

    #[test]
    fn test_query_orders_by_date_descending() {
        let body = run_query_body(&FirestoreConfig::new("p"));
        assert_eq!(
            body,
            json!({
                "structuredQuery": {
                    "from": [{"collectionId": "orders"}],
                    "orderBy": [{"field": {"fieldPath": "date"}, "direction": "DESCENDING"}]
                }
            })
        );
    }

    #[test]
    fn test_commit_body_lists_every_ref() {
        let refs = vec![
            DocumentRef::new("projects/p/databases/(default)/documents/orders/A"),
            DocumentRef::new("projects/p/databases/(default)/documents/orders/B"),
        ];
        let body = commit_body(&refs);
        let writes = body["writes"].as_array().unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(
            writes[1]["delete"],
            "projects/p/databases/(default)/documents/orders/B"
        );
    }

    #[test]
    fn test_parse_query_response_skips_markers() {
        let response = json!([
            {"readTime": "2024-01-03T00:00:00Z"},
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/orders/B",
                    "fields": {"uid": {"stringValue": "u2"}}
                },
                "readTime": "2024-01-03T00:00:00Z"
            },
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/orders/A",
                    "fields": {"uid": {"stringValue": "u1"}}
                }
            }
        ]);

        let docs = parse_query_response(&response).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.reference().id()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_parse_query_response_empty_collection() {
        let docs = parse_query_response(&json!([{"readTime": "2024-01-03T00:00:00Z"}])).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_parse_query_response_rejects_errors() {
        assert!(parse_query_response(&json!({"oops": 1})).is_err());
        assert!(parse_query_response(&json!([{"error": {"code": 7}}])).is_err());
    }

    #[test]
    fn test_emulator_uses_owner_token() {
        let store = emulator_store();
        assert_eq!(store.authorization().unwrap(), "Bearer owner");
        assert_eq!(
            store.describe(),
            "projects/shop/databases/(default)/documents/orders"
        );
    }

    #[test]
    fn test_production_without_key_material_fails_auth() {
        let key = ServiceAccountKey::from_json(r#"{"project_id":"shop"}"#).unwrap();
        let store = FirestoreStore::new(FirestoreConfig::new("shop"), key);
        assert!(store.authorization().is_err());
        // No request is attempted when there is nothing to delete
        assert!(store.delete_batch(&[]).is_ok());
    }
}
