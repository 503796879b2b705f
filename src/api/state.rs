use std::sync::Arc;

use crate::application::PersistenceService;
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub persistence: Arc<PersistenceService>,
    /// Index that user documents are written to.
    pub index: String,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        persistence: Arc<PersistenceService>,
        index: impl Into<String>,
        config: AppConfig,
    ) -> Self {
        Self {
            persistence,
            index: index.into(),
            config: Arc::new(config),
        }
    }
}
