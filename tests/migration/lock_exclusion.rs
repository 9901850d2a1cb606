use std::fs;
use std::sync::Arc;

use orderarchive::prelude::*;
use orderarchive::Error;

use crate::{order_doc, Workspace};

fn one_order() -> MemoryStore {
    MemoryStore::with_documents(vec![order_doc("A", "u1", "2024-01-01T00:00:00Z", &[])])
}

#[test]
fn test_present_marker_blocks_without_store_calls() {
    let ws = Workspace::new();
    fs::write(ws.lock(), "4242").unwrap();
    let store = one_order();

    let err = migrate(&store, ws.options()).unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(err.class().exit_code(), 3);
    assert!(err.to_string().contains(".pid"));
    assert!(err.to_string().contains("4242"));

    assert_eq!(store.fetch_calls(), 0);
    assert!(store.delete_calls().is_empty());
    assert!(!ws.archive().exists());
    // Someone else's marker is left alone
    assert_eq!(fs::read_to_string(ws.lock()).unwrap(), "4242");
}

#[test]
fn test_leftover_staging_file_blocks() {
    let ws = Workspace::new();
    fs::write(ws.staging(), "<orders><order>").unwrap();
    let store = one_order();

    let err = migrate(&store, ws.options()).unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("incomplete prior write"));
    assert_eq!(store.fetch_calls(), 0);
    assert!(!ws.lock().exists());
}

#[test]
fn test_staging_reported_before_archive() {
    let ws = Workspace::new();
    fs::write(ws.staging(), "").unwrap();
    fs::write(ws.archive(), "").unwrap();
    fs::write(ws.lock(), "1").unwrap();

    let err = migrate(one_order(), ws.options()).unwrap_err();
    assert_eq!(err.report().final_state, TransferState::Aborted);
    let Error::Transfer(e) = err;
    assert!(e.to_string().contains("orders.xml.tmp"));
    assert_eq!(e.state, TransferState::Start);
}

#[test]
fn test_lock_released_after_failed_run() {
    let ws = Workspace::new();
    let store = one_order();
    store.fail_fetch("UNAVAILABLE");

    let err = migrate(&store, ws.options()).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Store);
    assert!(!ws.lock().exists());

    // Nothing was written, so the next run can proceed
    let store = one_order();
    migrate(&store, ws.options()).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_only_one_of_two_racing_runs_proceeds() {
    let ws = Workspace::new();
    let fs: Arc<dyn Filesystem> = Arc::new(LocalFs::new());
    let first = one_order();
    let second = one_order();

    // Hold the marker as the first run would while it is between fetch and commit
    let guard = orderarchive_durability::LockGuard::acquire(Arc::clone(&fs), ws.lock()).unwrap();
    let err = TransferCoordinator::new(&second, Arc::clone(&fs), ws.options())
        .run()
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(second.fetch_calls(), 0);
    guard.release();

    TransferCoordinator::new(&first, fs, ws.options()).run().unwrap();
    assert!(first.is_empty());
    assert_eq!(second.len(), 1);
}
