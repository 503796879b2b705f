mod persistence;

pub use persistence::PersistenceService;
