//! Application error types and Axum response conversion.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use verdict_core::ModelError;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    /// Body is not JSON or was sent without a JSON content type.
    MalformedBody(String),
    /// Body is JSON but `input` is missing or not an array of numbers.
    InvalidInput(String),
    /// Feature vector length differs from the model's.
    FeatureMismatch(String),
    /// Model failed while computing the prediction.
    Inference(String),
    /// Predicted label has no integer form.
    LabelCoercion(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) | AppError::FeatureMismatch(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Inference(_) | AppError::LabelCoercion(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MalformedBody(_) => "malformed_body",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::FeatureMismatch(_) => "feature_mismatch",
            AppError::Inference(_) => "inference_failed",
            AppError::LabelCoercion(_) => "label_coercion",
        }
    }

    fn message(self) -> String {
        match self {
            AppError::MalformedBody(m)
            | AppError::InvalidInput(m)
            | AppError::FeatureMismatch(m)
            | AppError::Inference(m)
            | AppError::LabelCoercion(m) => m,
        }
    }
}

const NUMBER_OUT_OF_RANGE: &str = "number out of range";

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => AppError::InvalidInput(e.body_text()),
            // serde_json reports overflowing literals like `1e999` as syntax
            // errors, but the body itself is well-formed JSON.
            JsonRejection::JsonSyntaxError(e) if e.body_text().contains(NUMBER_OUT_OF_RANGE) => {
                AppError::InvalidInput(e.body_text())
            }
            other => AppError::MalformedBody(other.body_text()),
        }
    }
}

impl From<ModelError> for AppError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::FeatureMismatch { .. } => AppError::FeatureMismatch(e.to_string()),
            ModelError::NonFiniteFeature(_) => AppError::InvalidInput(e.to_string()),
            ModelError::LabelCoercion(_) => AppError::LabelCoercion(e.to_string()),
            other => AppError::Inference(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        (status, Json(ErrorResponse { error: self.message(), kind })).into_response()
    }
}
