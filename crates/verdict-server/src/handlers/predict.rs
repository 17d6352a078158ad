//! Prediction handler.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{debug, error, warn};
use verdict_core::predict_class;

use crate::dto::{PredictRequest, PredictResponse};
use crate::error::AppError;
use crate::ServerState;

/// POST /predict - Classifies a single feature vector.
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        let err = AppError::from(rejection);
        warn!(kind = err.kind(), "Rejected prediction request: {:?}", err);
        err
    })?;

    let prediction = predict_class(state.model.as_ref(), &req.input).map_err(|e| {
        let err = AppError::from(e);
        if err.status().is_server_error() {
            error!(kind = err.kind(), "Prediction failed: {:?}", err);
        } else {
            warn!(kind = err.kind(), "Rejected prediction request: {:?}", err);
        }
        err
    })?;

    debug!(features = req.input.len(), prediction, "Prediction served");
    Ok(Json(PredictResponse { prediction }))
}
