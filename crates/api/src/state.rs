use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`). There is no other cross-request state: the isolation scope is
/// built per request and discarded with it.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: workplan_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
