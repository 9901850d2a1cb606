//! Deletion only ever follows a committed archive, and only of what was fetched

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use orderarchive::prelude::*;
use orderarchive_durability::FsOp;

use crate::order_doc;

const ARCHIVE: &str = "/srv/archive/orders.xml";
const STAGING: &str = "/srv/archive/orders.xml.tmp";
const LOCK: &str = "/opt/orderarchive/.pid";

fn two_orders() -> MemoryStore {
    MemoryStore::with_documents(vec![
        order_doc("A", "u1", "2024-01-01T00:00:00Z", &[r#"{"id":"p1","amount":3}"#]),
        order_doc("B", "u2", "2024-01-02T00:00:00Z", &[]),
    ])
}

fn run(store: &MemoryStore, fs: &Arc<MemoryFs>) -> Result<TransferReport> {
    let fs: Arc<dyn Filesystem> = fs.clone();
    Ok(TransferCoordinator::new(store, fs, MigrationOptions::new(ARCHIVE).lock_path(LOCK)).run()?)
}

#[test]
fn test_delete_receives_exactly_the_fetched_refs() {
    let store = two_orders();
    let fs = Arc::new(MemoryFs::new());
    store.insert_after_fetch(order_doc("C", "u3", "2024-01-03T00:00:00Z", &[]));

    run(&store, &fs).unwrap();

    let calls = store.delete_calls();
    assert_eq!(calls.len(), 1);
    let ids: Vec<&str> = calls[0].iter().map(DocumentRef::id).collect();
    assert_eq!(ids, vec!["A", "B"]);

    // The late document survives for the next run
    assert_eq!(store.len(), 1);
    assert_eq!(store.documents()[0].reference().id(), "C");
    assert_eq!(store.fetch_calls(), 1);
}

#[test]
fn test_fetch_failure_writes_and_deletes_nothing() {
    let store = two_orders();
    store.fail_fetch("DEADLINE_EXCEEDED");
    let fs = Arc::new(MemoryFs::new());

    let err = run(&store, &fs).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Store);
    assert!(fs.paths().is_empty());
    assert!(store.delete_calls().is_empty());
}

#[test]
fn test_shape_failure_writes_and_deletes_nothing() {
    let store = two_orders();
    store.insert(
        Document::new(DocumentRef::new("projects/shop/databases/(default)/documents/orders/X"))
            .field("uid", 17i64),
    );
    let fs = Arc::new(MemoryFs::new());

    let err = run(&store, &fs).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Shape);
    assert!(err.to_string().contains("orders/X"));
    assert!(fs.paths().is_empty());
    assert!(store.delete_calls().is_empty());
    assert_eq!(store.len(), 3);
}

#[test]
fn test_interrupted_staging_write_leaves_no_archive() {
    let store = two_orders();
    let fs = Arc::new(MemoryFs::new());
    fs.fail_on(FsOp::Write, STAGING, io::ErrorKind::Other);

    let err = run(&store, &fs).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Archive);
    assert!(!fs.contains(ARCHIVE));
    assert!(!fs.contains(STAGING));
    assert!(store.delete_calls().is_empty());
    assert_eq!(store.len(), 2);
}

#[test]
fn test_failed_rename_keeps_sources() {
    let store = two_orders();
    let fs = Arc::new(MemoryFs::new());
    fs.fail_on(FsOp::Rename, STAGING, io::ErrorKind::PermissionDenied);

    let err = run(&store, &fs).unwrap_err();
    assert!(err.to_string().contains("no documents were deleted"));
    assert!(!fs.contains(ARCHIVE));
    assert!(store.delete_calls().is_empty());
    assert!(!fs.contains(LOCK));
}

#[test]
fn test_purge_failure_leaves_archive_and_sources() {
    let store = two_orders();
    store.fail_delete("ABORTED");
    let fs = Arc::new(MemoryFs::new());

    let err = run(&store, &fs).unwrap_err();
    assert!(err.is_duplication_risk());
    assert_eq!(err.class().exit_code(), 7);
    assert!(fs.contains(ARCHIVE));
    assert_eq!(store.len(), 2);
    assert_eq!(store.delete_calls().len(), 1);
    assert!(!fs.contains(LOCK));

    // The committed archive now blocks a rerun
    let rerun = run(&store, &fs).unwrap_err();
    assert!(rerun.is_precondition());
    assert_eq!(store.fetch_calls(), 1);
}

#[test]
fn test_staging_never_reaches_target_on_crash() {
    // Simulate a crash between fsync and rename: staging exists, target does not
    let fs = Arc::new(MemoryFs::new());
    fs.insert(PathBuf::from(STAGING), "<orders><order><uid>u1</uid>");
    let store = two_orders();

    let err = run(&store, &fs).unwrap_err();
    assert!(err.is_precondition());
    assert!(!fs.contains(ARCHIVE));
    assert_eq!(store.fetch_calls(), 0);
}
