//! Severity Inference Engine
//!
//! Loads the fitted scaler and classifier once at startup and scores
//! assembled feature vectors. LightGBM JSON dumps are evaluated natively;
//! ONNX exports run through tract-onnx.

mod artifacts;
mod classifier;
mod engine;
mod onnx;
mod scaler;
mod trees;

pub use artifacts::{ArtifactPaths, FittedArtifacts, ModelFormat};
pub use classifier::Classifier;
pub use engine::{PredictionResult, Predictor, SeverityLabel, SEVERE_THRESHOLD};
pub use onnx::OnnxClassifier;
pub use scaler::{RobustScaler, ScaledVector};
pub use trees::TreeEnsemble;

use std::path::PathBuf;

use feature_engine::{Feature, SchemaError};
use thiserror::Error;

/// Errors while loading or checking fitted artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {artifact}: {reason}")]
    Parse { artifact: &'static str, reason: String },
    #[error("Invalid {artifact}: {reason}")]
    Invalid { artifact: &'static str, reason: String },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Model load failed: {0}")]
    ModelLoad(String),
}

/// Errors during a single prediction
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Invalid model output: {0}")]
    InvalidOutput(String),
}

/// Errors from the end-to-end prediction pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Non-finite value in column {feature} after {stage}")]
    NonFinite { feature: Feature, stage: &'static str },
    #[error(transparent)]
    Inference(#[from] InferenceError),
}
