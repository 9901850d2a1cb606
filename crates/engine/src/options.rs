//! Migration options

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use orderarchive_durability::default_lock_path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do with a line item whose encoded payload cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineItemPolicy {
    /// Keep the item as an empty product (`id = ""`, `amount = 0`)
    ZeroValue,
    /// Drop the item and report it
    Skip,
    /// Abort the run
    Fail,
}

impl Default for LineItemPolicy {
    fn default() -> Self {
        LineItemPolicy::Skip
    }
}

impl LineItemPolicy {
    /// All policies, in CLI order
    pub const ALL: [LineItemPolicy; 3] = [
        LineItemPolicy::ZeroValue,
        LineItemPolicy::Skip,
        LineItemPolicy::Fail,
    ];

    /// CLI name of the policy
    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemPolicy::ZeroValue => "zero-value",
            LineItemPolicy::Skip => "skip",
            LineItemPolicy::Fail => "fail",
        }
    }
}

impl fmt::Display for LineItemPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown policy name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown line item policy '{0}' (expected zero-value, skip or fail)")]
pub struct ParsePolicyError(String);

impl FromStr for LineItemPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LineItemPolicy::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePolicyError(s.to_string()))
    }
}

/// Options for one migration run
///
/// ```
/// use orderarchive_engine::{LineItemPolicy, MigrationOptions};
///
/// let opts = MigrationOptions::new("/var/archive/orders.xml")
///     .lock_path("/tmp/orderarchive.pid")
///     .line_item_policy(LineItemPolicy::Fail);
/// assert!(!opts.dry_run);
/// ```
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Final archive location
    pub archive_path: PathBuf,
    /// Lock marker location; `None` uses `<exe dir>/.pid`
    pub lock_path: Option<PathBuf>,
    /// Handling of undecodable line items
    pub line_item_policy: LineItemPolicy,
    /// Stop after the transform step: nothing is written or deleted
    pub dry_run: bool,
}

impl MigrationOptions {
    /// Options targeting `archive_path` with every other setting defaulted
    pub fn new(archive_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
            lock_path: None,
            line_item_policy: LineItemPolicy::default(),
            dry_run: false,
        }
    }

    /// Use an explicit lock marker path
    pub fn lock_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_path = Some(path.into());
        self
    }

    /// Set the line item policy
    pub fn line_item_policy(mut self, policy: LineItemPolicy) -> Self {
        self.line_item_policy = policy;
        self
    }

    /// Enable or disable dry-run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Final archive location
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Lock marker path for this run
    pub fn resolve_lock_path(&self) -> io::Result<PathBuf> {
        match &self.lock_path {
            Some(path) => Ok(path.clone()),
            None => default_lock_path(),
        }
    }
}
