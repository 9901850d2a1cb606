use std::time::Duration;

/// Collection migrated by default
pub const DEFAULT_COLLECTION: &str = "orders";

/// Field the fetch query orders by (descending)
pub const DEFAULT_ORDER_BY: &str = "date";

const PRODUCTION_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Where requests are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Google's production endpoint with OAuth
    Production,
    /// Local emulator at `host:port`, no OAuth
    Emulator(String),
}

/// Firestore connection options
///
/// ```
/// use std::time::Duration;
/// use orderarchive_store::FirestoreConfig;
///
/// let config = FirestoreConfig::new("my-project")
///     .collection("orders")
///     .timeout(Duration::from_secs(30));
/// assert_eq!(config.documents_path(), "projects/my-project/databases/(default)/documents");
/// ```
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// Google Cloud project
    pub project_id: String,
    /// Database id, `(default)` unless set
    pub database: String,
    /// Collection holding the orders
    pub collection: String,
    /// Field the snapshot query sorts on, descending
    pub order_by: String,
    /// Production or emulator
    pub endpoint: Endpoint,
    /// Per-request timeout; `None` leaves it to the HTTP agent
    pub timeout: Option<Duration>,
}

impl FirestoreConfig {
    /// Production settings for `project_id`
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: "(default)".to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            order_by: DEFAULT_ORDER_BY.to_string(),
            endpoint: Endpoint::Production,
            timeout: None,
        }
    }

    /// Use a non-default database
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Migrate another collection
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Sort the snapshot on another field
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = field.into();
        self
    }

    /// Send requests to the emulator at `host` (`host:port`)
    pub fn emulator(mut self, host: impl Into<String>) -> Self {
        self.endpoint = Endpoint::Emulator(host.into());
        self
    }

    /// Bound every request by `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// REST root, e.g. `https://firestore.googleapis.com/v1`
    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Endpoint::Production => PRODUCTION_BASE_URL.to_string(),
            Endpoint::Emulator(host) => format!("http://{}/v1", host.trim_end_matches('/')),
        }
    }

    /// `projects/<p>/databases/<db>`
    pub fn database_path(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database)
    }

    /// `projects/<p>/databases/<db>/documents`
    pub fn documents_path(&self) -> String {
        format!("{}/documents", self.database_path())
    }

    /// `projects/<p>/databases/<db>/documents/<collection>`
    pub fn collection_path(&self) -> String {
        format!("{}/{}", self.documents_path(), self.collection)
    }
}
