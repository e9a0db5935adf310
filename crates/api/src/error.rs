//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use inference_engine::PipelineError;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body was not valid JSON or did not match the record shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// One or more measurements out of range
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("Missing or invalid API key")]
    Unauthorized,

    #[error("Invalid host header")]
    InvalidHost,

    #[error("Model not loaded: {0}")]
    NotReady(String),

    #[error("Prediction failed: {source}")]
    Prediction {
        source: PipelineError,
        expose_detail: bool,
    },

    #[error("Metrics exporter not installed")]
    MetricsUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::InvalidBody(msg) => (StatusCode::UNPROCESSABLE_ENTITY, json!(msg)),
            ApiError::Validation(errors) => {
                let fields: Vec<_> = errors
                    .iter()
                    .map(|e| json!({"field": e.field(), "message": e.to_string()}))
                    .collect();
                (StatusCode::UNPROCESSABLE_ENTITY, json!(fields))
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!("Missing or invalid API key")),
            ApiError::InvalidHost => (StatusCode::BAD_REQUEST, json!("Invalid host header")),
            ApiError::NotReady(reason) => {
                tracing::warn!("Prediction requested while not ready: {}", reason);
                (StatusCode::SERVICE_UNAVAILABLE, json!("Model not loaded"))
            }
            ApiError::Prediction {
                source,
                expose_detail,
            } => {
                tracing::error!("Prediction error: {}", source);
                let detail = if *expose_detail {
                    source.to_string()
                } else {
                    "Prediction failed".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, json!(detail))
            }
            ApiError::MetricsUnavailable => (StatusCode::NOT_FOUND, json!("Metrics exporter not installed")),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
