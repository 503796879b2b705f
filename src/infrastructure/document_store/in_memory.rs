use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    overlay,
    ports::{
        BulkIndexItem, BulkIndexResponse, DocumentRef, DocumentStore, IndexedItem, StoredDocument,
    },
    Fields, Location, StoreError,
};

type Key = (String, String, String);

fn key(location: &Location, id: &str) -> Key {
    (
        location.index.clone(),
        location.doc_type.clone(),
        id.to_string(),
    )
}

/// Process-local store with the same observable semantics as the remote one:
/// generated ids, doc-merge updates, not-found on missing documents.
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<Key, Fields>>,
    calls: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of store operations issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(e: impl std::fmt::Display) -> StoreError {
    StoreError::Internal(e.to_string())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn bulk_index(&self, items: &[BulkIndexItem]) -> Result<BulkIndexResponse, StoreError> {
        self.record_call();
        let mut store = self.documents.write().map_err(poisoned)?;

        let items = items
            .iter()
            .map(|item| {
                let id = Uuid::new_v4().simple().to_string();
                store.insert(key(&item.location, &id), item.body.clone());
                Ok(IndexedItem {
                    id,
                    source: Fields::new(),
                })
            })
            .collect();

        Ok(BulkIndexResponse { items })
    }

    async fn get(&self, doc: &DocumentRef) -> Result<StoredDocument, StoreError> {
        self.record_call();
        let store = self.documents.read().map_err(poisoned)?;

        store
            .get(&key(&doc.location, &doc.id))
            .map(|source| StoredDocument {
                id: doc.id.clone(),
                source: source.clone(),
            })
            .ok_or_else(|| StoreError::not_found(&doc.location.index, &doc.id))
    }

    async fn update(
        &self,
        doc: &DocumentRef,
        partial: &Fields,
    ) -> Result<StoredDocument, StoreError> {
        self.record_call();
        let mut store = self.documents.write().map_err(poisoned)?;

        let existing = store
            .get_mut(&key(&doc.location, &doc.id))
            .ok_or_else(|| StoreError::not_found(&doc.location.index, &doc.id))?;
        overlay(existing, partial.clone());

        Ok(StoredDocument {
            id: doc.id.clone(),
            source: existing.clone(),
        })
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        self.record_call();
        let mut store = self.documents.write().map_err(poisoned)?;

        store
            .remove(&key(&doc.location, &doc.id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(&doc.location.index, &doc.id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
