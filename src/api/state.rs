//! Shared state handed to every handler.

use crate::config::settings::Settings;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Application state available to handlers via `State<AppState>`.
///
/// Cloning is cheap: the connection and the settings both sit behind an
/// `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
    /// Settings loaded at startup
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Bundles a connection and settings.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, settings: Settings) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
        }
    }
}
