//! Route registration.

pub mod health;
pub mod operations;

use axum::Router;

use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(operations::router())
}
