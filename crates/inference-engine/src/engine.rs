//! Inference Facade

use std::time::Instant;

use feature_engine::{extract, Feature, RawAccidentRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::artifacts::FittedArtifacts;
use crate::{InferenceError, PipelineError};

/// Probability at or above which an accident is labelled severe
pub const SEVERE_THRESHOLD: f64 = 0.5;

/// Binary severity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityLabel {
    Severe,
    Minor,
}

impl SeverityLabel {
    /// Label for a positive-class probability
    pub fn from_probability(p: f64) -> Self {
        if p >= SEVERE_THRESHOLD {
            SeverityLabel::Severe
        } else {
            SeverityLabel::Minor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLabel::Severe => "Severe",
            SeverityLabel::Minor => "Minor",
        }
    }
}

/// Outcome of one prediction
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    /// Probability of the severe class (0.0 to 1.0)
    pub severity_probability: f64,
    pub prediction_label: SeverityLabel,
    /// Wall time of encode through classify
    pub processing_time_ms: f64,
    /// Columns zero-filled during assembly
    #[serde(skip_serializing)]
    pub missing_features: Vec<Feature>,
}

/// Runs encode, assemble, scale and classify over shared artifacts
#[derive(Debug, Clone)]
pub struct Predictor {
    artifacts: FittedArtifacts,
}

impl Predictor {
    pub fn new(artifacts: FittedArtifacts) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &FittedArtifacts {
        &self.artifacts
    }

    /// Score one raw record
    pub fn predict(&self, record: &RawAccidentRecord) -> Result<PredictionResult, PipelineError> {
        let start = Instant::now();

        let assembly = extract(record);
        if !assembly.missing.is_empty() {
            warn!(
                count = assembly.missing.len(),
                "Prediction used zero-filled features"
            );
        }
        if let Some((feature, _)) = assembly.vector.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PipelineError::NonFinite {
                feature,
                stage: "encoding",
            });
        }

        let scaled = self.artifacts.scaler.transform(&assembly.vector);
        if let Some(i) = scaled.as_slice().iter().position(|v| !v.is_finite()) {
            return Err(PipelineError::NonFinite {
                feature: Feature::ALL[i],
                stage: "scaling",
            });
        }

        let p = self.artifacts.classifier.predict_proba(&scaled)?;
        if !(0.0..=1.0).contains(&p) {
            return Err(InferenceError::InvalidOutput(format!("probability {} outside [0, 1]", p)).into());
        }

        let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        let prediction_label = SeverityLabel::from_probability(p);
        debug!(
            probability = p,
            label = prediction_label.as_str(),
            "Prediction completed in {:.3}ms",
            processing_time_ms
        );

        Ok(PredictionResult {
            severity_probability: p,
            prediction_label,
            processing_time_ms,
            missing_features: assembly.missing,
        })
    }
}
