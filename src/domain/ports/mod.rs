mod document_store;

pub use document_store::{
    BulkIndexItem, BulkIndexResponse, DocumentRef, DocumentStore, IndexedItem, StoredDocument,
};
