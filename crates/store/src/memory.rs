//! In-memory document store
//!
//! Holds documents in insertion order and returns them in that order from
//! `fetch_all`. Every call is recorded so tests can assert exactly what the
//! coordinator asked for, and either call can be made to fail.

use orderarchive_core::{Document, DocumentRef};
use parking_lot::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

#[derive(Debug, Default)]
struct State {
    documents: Vec<Document>,
    fetch_calls: usize,
    delete_calls: Vec<Vec<DocumentRef>>,
    fail_fetch: Option<String>,
    fail_delete: Option<String>,
    after_fetch: Vec<Document>,
}

/// In-memory store for tests and local experiments
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `documents`
    pub fn with_documents(documents: Vec<Document>) -> Self {
        let store = Self::new();
        store.state.lock().documents = documents;
        store
    }

    /// Append a document
    pub fn insert(&self, document: Document) {
        self.state.lock().documents.push(document);
    }

    /// Documents currently stored
    pub fn documents(&self) -> Vec<Document> {
        self.state.lock().documents.clone()
    }

    /// Number of documents currently stored
    pub fn len(&self) -> usize {
        self.state.lock().documents.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.state.lock().documents.is_empty()
    }

    /// Number of `fetch_all` calls so far
    pub fn fetch_calls(&self) -> usize {
        self.state.lock().fetch_calls
    }

    /// Arguments of every `delete_batch` call so far
    pub fn delete_calls(&self) -> Vec<Vec<DocumentRef>> {
        self.state.lock().delete_calls.clone()
    }

    /// Make `fetch_all` fail with `message`
    pub fn fail_fetch(&self, message: impl Into<String>) {
        self.state.lock().fail_fetch = Some(message.into());
    }

    /// Make `delete_batch` fail with `message` (nothing is deleted)
    pub fn fail_delete(&self, message: impl Into<String>) {
        self.state.lock().fail_delete = Some(message.into());
    }

    /// Insert `document` right after the next fetch snapshot is taken,
    /// as a concurrent writer would
    pub fn insert_after_fetch(&self, document: Document) {
        self.state.lock().after_fetch.push(document);
    }
}

impl DocumentStore for MemoryStore {
    fn fetch_all(&self) -> StoreResult<Vec<Document>> {
        let mut state = self.state.lock();
        state.fetch_calls += 1;
        if let Some(message) = &state.fail_fetch {
            return Err(StoreError::Injected(message.clone()));
        }

        let snapshot = state.documents.clone();
        let late = std::mem::take(&mut state.after_fetch);
        state.documents.extend(late);
        Ok(snapshot)
    }

    fn delete_batch(&self, refs: &[DocumentRef]) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.delete_calls.push(refs.to_vec());
        if let Some(message) = &state.fail_delete {
            return Err(StoreError::Injected(message.clone()));
        }

        state
            .documents
            .retain(|doc| !refs.contains(doc.reference()));
        Ok(())
    }

    fn describe(&self) -> String {
        "memory store".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> Document {
        Document::new(DocumentRef::new(format!("orders/{}", id))).field("uid", id)
    }

    #[test]
    fn test_fetch_returns_insertion_order() {
        let store = MemoryStore::with_documents(vec![doc("b"), doc("a")]);
        let fetched = store.fetch_all().unwrap();
        let ids: Vec<_> = fetched.iter().map(|d| d.reference().id()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.fetch_calls(), 1);
    }

    #[test]
    fn test_delete_removes_only_given_refs() {
        let store = MemoryStore::with_documents(vec![doc("a"), doc("b"), doc("c")]);
        store
            .delete_batch(&[DocumentRef::new("orders/a"), DocumentRef::new("orders/c")])
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.documents()[0].reference().id(), "b");
        assert_eq!(store.delete_calls().len(), 1);
    }

    #[test]
    fn test_injected_failures() {
        let store = MemoryStore::with_documents(vec![doc("a")]);
        store.fail_fetch("unavailable");
        store.fail_delete("deadline exceeded");

        assert_eq!(store.fetch_all().unwrap_err().to_string(), "unavailable");
        assert!(store.delete_batch(&[DocumentRef::new("orders/a")]).is_err());
        // Failed delete is recorded but removes nothing
        assert_eq!(store.delete_calls().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_after_fetch_is_not_in_snapshot() {
        let store = MemoryStore::with_documents(vec![doc("a")]);
        store.insert_after_fetch(doc("late"));

        let snapshot = store.fetch_all().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }
}
