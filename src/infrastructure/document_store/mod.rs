mod elasticsearch;
mod in_memory;

pub use elasticsearch::ElasticsearchStore;
pub use in_memory::InMemoryDocumentStore;
