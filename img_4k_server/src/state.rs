use shared_utils::ServiceConfig;
use std::sync::Arc;

/// Shared by every handler; configuration is fixed once the router is built.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
