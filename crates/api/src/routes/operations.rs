//! Handler for the single named-operation endpoint.

use axum::extract::State;
use axum::{routing::post, Json, Router};
use serde_json::Value;

use crate::error::AppResult;
use crate::ops::{self, OperationRequest};
use crate::state::AppState;

/// POST /api/v1/operations
///
/// Body: `{"operation": "<name>", "arguments": {...}}`. Queries answer
/// `{"data": ...}`; mutations answer `{"payload": ..., "success": ...,
/// "errors": [...]}`.
async fn run_operation(
    State(state): State<AppState>,
    Json(request): Json<OperationRequest>,
) -> AppResult<Json<Value>> {
    let result = ops::dispatch(&state, &request).await?;
    Ok(Json(result))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/operations", post(run_operation))
}
