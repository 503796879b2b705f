//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete stores,
//! so the same persistence rules apply to Elasticsearch and to the in-memory
//! store used in tests.

pub mod services;

pub use services::PersistenceService;
