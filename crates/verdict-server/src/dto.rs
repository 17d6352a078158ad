//! Request and response bodies.

use serde::{Deserialize, Serialize};
use verdict_core::FeatureVector;

/// Body of `POST /predict`.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub input: FeatureVector,
}

/// Successful prediction.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: i64,
}
