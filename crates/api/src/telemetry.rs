//! Prometheus metrics

use inference_engine::SeverityLabel;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global recorder and return a handle for `/metrics`
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe();
    Ok(handle)
}

fn describe() {
    metrics::describe_counter!("predictions_total", "Completed predictions by label");
    metrics::describe_counter!("prediction_failures_total", "Predictions that returned an error");
    metrics::describe_counter!(
        "missing_features_total",
        "Feature columns zero-filled during assembly"
    );
    metrics::describe_counter!("validation_failures_total", "Requests rejected by range checks");
    metrics::describe_histogram!("prediction_latency_ms", "Pipeline time per prediction");
}

pub fn record_prediction(label: SeverityLabel, latency_ms: f64, missing: usize) {
    metrics::counter!("predictions_total", "label" => label.as_str()).increment(1);
    metrics::histogram!("prediction_latency_ms").record(latency_ms);
    if missing > 0 {
        metrics::counter!("missing_features_total").increment(missing as u64);
    }
}

pub fn record_failure() {
    metrics::counter!("prediction_failures_total").increment(1);
}

pub fn record_validation_failure() {
    metrics::counter!("validation_failures_total").increment(1);
}
