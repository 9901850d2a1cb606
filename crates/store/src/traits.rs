//! Store trait

use orderarchive_core::{Document, DocumentRef};

use crate::error::StoreResult;

/// A remote collection of order documents
///
/// Both calls are synchronous and attempted once; the coordinator never
/// retries.
pub trait DocumentStore {
    /// Snapshot every document in the collection
    ///
    /// Implementations return documents in the store's query order
    /// (descending by date for Firestore). Callers must not re-sort.
    fn fetch_all(&self) -> StoreResult<Vec<Document>>;

    /// Delete exactly the given documents in one batch
    ///
    /// The batch is all-or-nothing where the store supports it.
    fn delete_batch(&self, refs: &[DocumentRef]) -> StoreResult<()>;

    /// Human-readable location of the collection, for logs
    fn describe(&self) -> String {
        "document store".to_string()
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn fetch_all(&self) -> StoreResult<Vec<Document>> {
        (**self).fetch_all()
    }

    fn delete_batch(&self, refs: &[DocumentRef]) -> StoreResult<()> {
        (**self).delete_batch(refs)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn fetch_all(&self) -> StoreResult<Vec<Document>> {
        (**self).fetch_all()
    }

    fn delete_batch(&self, refs: &[DocumentRef]) -> StoreResult<()> {
        (**self).delete_batch(refs)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
