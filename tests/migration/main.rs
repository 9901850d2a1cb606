//! Migration integration tests
//!
//! Full runs through the facade against a [`MemoryStore`] and either the
//! real filesystem (in a temp dir) or a [`MemoryFs`] with injected failures.

mod commit_ordering;
mod end_to_end;
mod lock_exclusion;
mod round_trip;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use orderarchive::prelude::*;
use tempfile::TempDir;

/// Temp directory holding the archive and lock marker of one test
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn archive(&self) -> PathBuf {
        self.dir.path().join("orders.xml")
    }

    pub fn staging(&self) -> PathBuf {
        self.dir.path().join("orders.xml.tmp")
    }

    pub fn lock(&self) -> PathBuf {
        self.dir.path().join(".pid")
    }

    pub fn options(&self) -> MigrationOptions {
        MigrationOptions::new(self.archive()).lock_path(self.lock())
    }
}

pub fn date(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn order_doc(id: &str, uid: &str, when: &str, products: &[&str]) -> Document {
    Document::new(DocumentRef::new(format!(
        "projects/shop/databases/(default)/documents/orders/{}",
        id
    )))
    .field("uid", uid)
    .field("date", date(when))
    .field("products", products.to_vec())
}

pub fn read_archive(path: &Path) -> Archive {
    ArchiveReader::new(std::sync::Arc::new(LocalFs::new()))
        .read(path)
        .unwrap()
}
