use std::sync::Arc;

use dyemark_processor::api::ExternalProcessor;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and everything else is
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: dyemark_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Client for the external task processor.
    pub processor: Arc<dyn ExternalProcessor>,
}
