use std::sync::Arc;

use crate::ai::AiService;
use crate::config::AppConfig;
use crate::database::{DocumentStore, Entity, Repository};
use crate::events::EventBus;

/// Shared application state, handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub events: EventBus,
    pub ai: Arc<AiService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, events: EventBus, ai: AiService, config: AppConfig) -> Self {
        Self {
            store,
            events,
            ai: Arc::new(ai),
            config: Arc::new(config),
        }
    }

    pub fn repo<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }
}
