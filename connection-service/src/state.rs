//! Application state for connection service.

use std::sync::Arc;

use common::config::AppConfig;

use crate::manager::ConnectionManager;
use crate::sql::SqlDialectDriver;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub manager: Arc<ConnectionManager>,
}

impl AppState {
    /// Creates a new application state with an empty connection registry.
    pub fn new(config: AppConfig) -> Self {
        let driver = SqlDialectDriver::new(config.pool.clone());
        Self {
            manager: Arc::new(ConnectionManager::new(driver)),
            config,
        }
    }
}
