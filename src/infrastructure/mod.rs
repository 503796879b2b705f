pub mod config;
pub mod document_store;

pub use config::{ApiFlavor, AppConfig, ConfigError, ElasticsearchConfig};
pub use document_store::{ElasticsearchStore, InMemoryDocumentStore};
