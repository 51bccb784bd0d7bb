//! Shared application state handed to every handler.

use std::sync::Arc;

use atelier_db::DbPool;
use atelier_events::EventBus;

use crate::config::ServerConfig;

/// State shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Arc<ServerConfig>, event_bus: Arc<EventBus>) -> Self {
        Self {
            pool,
            config,
            event_bus,
        }
    }
}
