use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use orderarchive_engine::{LineItemPolicy, MigrationOptions};
use orderarchive_store::firestore::{DEFAULT_COLLECTION, DEFAULT_ORDER_BY};
use orderarchive_store::FirestoreConfig;

/// Move every order from a Firestore collection into an XML archive,
/// then delete the archived orders from Firestore.
#[derive(Debug, Parser)]
#[command(name = "orderarchive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Archive file to create; must not exist yet.
    pub archive: PathBuf,

    /// Service-account key file (JSON).
    pub credentials: PathBuf,

    /// Lock marker location (default: `.pid` next to the executable).
    #[arg(long, value_name = "PATH")]
    pub lock_file: Option<PathBuf>,

    /// Collection to migrate.
    #[arg(long, default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// Field the collection is ordered by (descending).
    #[arg(long, default_value = DEFAULT_ORDER_BY)]
    pub order_by: String,

    /// Handling of line items that cannot be decoded: zero-value, skip or fail.
    #[arg(long, value_name = "POLICY", default_value_t = LineItemPolicy::Skip)]
    pub line_item_policy: LineItemPolicy,

    /// Fetch and validate only; write nothing and delete nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// HTTP timeout for each Firestore request, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Firestore emulator `host:port`; disables OAuth.
    #[arg(long, env = "FIRESTORE_EMULATOR_HOST", value_name = "HOST")]
    pub emulator_host: Option<String>,
}

impl Cli {
    pub fn migration_options(&self) -> MigrationOptions {
        let mut options = MigrationOptions::new(&self.archive)
            .line_item_policy(self.line_item_policy)
            .dry_run(self.dry_run);
        if let Some(path) = &self.lock_file {
            options = options.lock_path(path);
        }
        options
    }

    /// Apply the connection flags on top of the project's defaults
    pub fn firestore_config(&self, config: FirestoreConfig) -> FirestoreConfig {
        let mut config = config
            .collection(self.collection.as_str())
            .order_by(self.order_by.as_str());
        if let Some(secs) = self.timeout_secs {
            config = config.timeout(Duration::from_secs(secs));
        }
        match self.emulator_host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => config.emulator(host),
            _ => config,
        }
    }
}
