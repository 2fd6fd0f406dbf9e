use std::sync::Arc;

use application::{Orchestrator, Registry};

/// Shared state handed to every route handler
pub struct AppState {
    pub registry: Arc<Registry>,
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            orchestrator: Orchestrator::new(registry.clone()),
            registry,
        }
    }
}
