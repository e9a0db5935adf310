//! Prediction Route

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use feature_engine::RawAccidentRecord;
use inference_engine::SeverityLabel;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::{telemetry, ApiError, ApiResult, AppState};

/// Response body for `POST /predict`
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub severity_probability: f64,
    pub prediction_label: SeverityLabel,
    pub processing_time_ms: f64,
}

/// Round to two decimals for the wire
fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

/// Score one accident record
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawAccidentRecord>, JsonRejection>,
) -> ApiResult<Json<PredictionResponse>> {
    let Json(record) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;

    if let Err(errors) = state.validator.validate(&record).into_result() {
        telemetry::record_validation_failure();
        return Err(ApiError::Validation(errors));
    }

    let predictor = state.artifacts.predictor()?;
    let result = predictor.predict(&record).map_err(|source| {
        telemetry::record_failure();
        ApiError::Prediction {
            source,
            expose_detail: state.settings.security.expose_error_detail,
        }
    })?;

    telemetry::record_prediction(
        result.prediction_label,
        result.processing_time_ms,
        result.missing_features.len(),
    );
    debug!(
        probability = result.severity_probability,
        label = result.prediction_label.as_str(),
        "Prediction served"
    );

    Ok(Json(PredictionResponse {
        severity_probability: result.severity_probability,
        prediction_label: result.prediction_label,
        processing_time_ms: round_ms(result.processing_time_ms),
    }))
}
