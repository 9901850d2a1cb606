use std::fs;

use orderarchive::prelude::*;

use crate::{date, order_doc, read_archive, Workspace};

#[test]
fn test_two_document_migration() {
    let ws = Workspace::new();
    let store = MemoryStore::with_documents(vec![
        order_doc("A", "u1", "2024-01-01T00:00:00Z", &[r#"{"id":"p1","amount":3}"#]),
        order_doc("B", "u2", "2024-01-02T00:00:00Z", &[]),
    ]);

    let report = migrate(&store, ws.options()).unwrap();
    assert_eq!(report.final_state, TransferState::Done);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.deleted, 2);

    let archive = read_archive(&ws.archive());
    let orders = archive.orders();
    assert_eq!(orders.len(), 2);

    assert_eq!(orders[0].uid(), "u1");
    assert_eq!(orders[0].date(), date("2024-01-01T00:00:00Z"));
    assert_eq!(orders[0].products(), &[Product::new("p1", 3)]);

    assert_eq!(orders[1].uid(), "u2");
    assert!(orders[1].products().is_empty());

    assert!(store.is_empty());
    assert!(!ws.lock().exists());
    assert!(!ws.staging().exists());
}

#[test]
fn test_archive_uses_legacy_tags() {
    let ws = Workspace::new();
    let store = MemoryStore::with_documents(vec![order_doc(
        "A",
        "u1",
        "2024-01-01T00:00:00Z",
        &[r#"{"id":"p1","amount":3}"#],
    )]);

    migrate(&store, ws.options()).unwrap();

    let xml = fs::read_to_string(ws.archive()).unwrap();
    assert!(xml.starts_with("<orders>"));
    assert!(xml.contains("<uid>u1</uid>"));
    assert!(xml.contains("<date>2024-01-01T00:00:00Z</date>"));
    assert!(xml.contains("<product><code>p1</code><amount>3</amount></product>"));
}

#[test]
fn test_empty_collection_writes_empty_archive() {
    let ws = Workspace::new();
    let store = MemoryStore::new();

    let report = migrate(&store, ws.options()).unwrap();
    assert_eq!(report.archived, 0);
    assert!(read_archive(&ws.archive()).is_empty());
}

#[test]
fn test_skipped_line_items_are_reported() {
    let ws = Workspace::new();
    let store = MemoryStore::with_documents(vec![order_doc(
        "A",
        "u1",
        "2024-01-01T00:00:00Z",
        &["{broken", r#"{"id":"p2","amount":-1}"#],
    )]);

    let report = migrate(&store, ws.options()).unwrap();
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].document.id(), "A");

    let archive = read_archive(&ws.archive());
    assert_eq!(archive.orders()[0].products(), &[Product::new("p2", -1)]);
}
