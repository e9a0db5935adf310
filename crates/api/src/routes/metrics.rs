//! Metrics Route

use axum::extract::State;
use std::sync::Arc;

use crate::{ApiError, ApiResult, AppState};

/// Prometheus text exposition
pub async fn render(State(state): State<Arc<AppState>>) -> ApiResult<String> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(ApiError::MetricsUnavailable)
}
