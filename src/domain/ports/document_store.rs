use async_trait::async_trait;

use crate::domain::{errors::StoreError, Fields, Location};

/// Address of one stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub location: Location,
    pub id: String,
}

impl DocumentRef {
    pub fn new(location: &Location, id: impl Into<String>) -> Self {
        Self {
            location: location.clone(),
            id: id.into(),
        }
    }
}

/// One entry of a bulk index request. The store assigns the identifier.
#[derive(Debug, Clone)]
pub struct BulkIndexItem {
    pub location: Location,
    pub body: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedItem {
    pub id: String,
    /// Fields the store echoed back, if any.
    pub source: Fields,
}

/// Per-item outcomes, in request order.
#[derive(Debug, Default)]
pub struct BulkIndexResponse {
    pub items: Vec<Result<IndexedItem, StoreError>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub source: Fields,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn bulk_index(&self, items: &[BulkIndexItem]) -> Result<BulkIndexResponse, StoreError>;

    async fn get(&self, doc: &DocumentRef) -> Result<StoredDocument, StoreError>;

    /// Merges `partial` into the stored document. The returned source may be
    /// empty when the store does not echo the merged document.
    async fn update(&self, doc: &DocumentRef, partial: &Fields)
        -> Result<StoredDocument, StoreError>;

    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError>;

    /// Succeeds when the backing cluster answers.
    async fn ping(&self) -> Result<(), StoreError>;
}
