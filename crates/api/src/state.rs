use std::sync::Arc;

use curator_core::catalog::{CatalogAdapter, DeletionExecutor};
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: curator_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Read access to the media catalog.
    pub catalog: Arc<dyn CatalogAdapter>,
    /// Removes approved media.
    pub deleter: Arc<dyn DeletionExecutor>,
    /// Manually triggered scans running in the background. Drained on shutdown.
    pub scan_tasks: TaskTracker,
}
