use std::sync::Arc;

use axum::{extract::State, Json};
use verdict_core::ModelInfo;

use crate::ServerState;

/// GET /model - Describes the loaded model.
pub async fn info(State(state): State<Arc<ServerState>>) -> Json<ModelInfo> {
    Json(state.model.info())
}
