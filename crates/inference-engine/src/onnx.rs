//! ONNX Classifier
//!
//! Runs a classifier exported with skl2onnx/onnxmltools through tract-onnx.
//! The export must have the zipmap post-processor disabled so the last
//! output is a plain `[1, 2]` float tensor of class probabilities.

use std::fs;
use std::path::Path;

use feature_engine::FEATURE_COUNT;
use serde::Deserialize;
use tract_onnx::prelude::*;
use tracing::info;

use crate::classifier::Classifier;
use crate::scaler::ScaledVector;
use crate::{ArtifactError, InferenceError};

/// Column list stored next to the `.onnx` file.
///
/// ONNX graphs take one unnamed tensor, so the training column order has
/// to travel separately.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColumnsFile {
    Plain(Vec<String>),
    Wrapped {
        #[serde(alias = "feature_names_in_")]
        feature_names: Vec<String>,
        #[serde(default)]
        version: Option<String>,
    },
}

/// Binary classifier backed by a tract execution plan
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    feature_names: Vec<String>,
    version: Option<String>,
}

impl OnnxClassifier {
    /// Load and optimize an ONNX graph with a fixed `[1, N]` input
    pub fn load(model_path: &Path, columns_path: &Path) -> Result<Self, ArtifactError> {
        info!("Loading ONNX model from: {}", model_path.display());

        let columns = fs::read_to_string(columns_path).map_err(|e| ArtifactError::Io {
            path: columns_path.to_path_buf(),
            source: e,
        })?;
        let (feature_names, version) = match serde_json::from_str(&columns) {
            Ok(ColumnsFile::Plain(names)) => (names, None),
            Ok(ColumnsFile::Wrapped {
                feature_names,
                version,
            }) => (feature_names, version),
            Err(e) => {
                return Err(ArtifactError::Parse {
                    artifact: "model columns",
                    reason: e.to_string(),
                })
            }
        };

        let n = feature_names.len();
        let plan = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|m| m.with_input_fact(0, f32::fact([1, n]).into()))
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| ArtifactError::ModelLoad(format!("{}: {}", model_path.display(), e)))?;

        info!("ONNX model ready with {} input columns", n);
        Ok(Self {
            plan,
            feature_names,
            version,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn predict_proba(&self, input: &ScaledVector) -> Result<f64, InferenceError> {
        let values = input.to_f32();
        if values.len() != FEATURE_COUNT {
            return Err(InferenceError::InvalidInputShape {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }

        let tensor = Tensor::from_shape(&[1, values.len()], &values)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        // Classifier exports emit (label, probabilities); take the last
        let probabilities = outputs
            .last()
            .ok_or_else(|| InferenceError::InvalidOutput("model produced no outputs".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?;

        let values: Vec<f32> = probabilities.iter().copied().collect();
        let p = match values.as_slice() {
            [_, severe] => *severe,
            [single] => *single,
            other => {
                return Err(InferenceError::InvalidOutput(format!(
                    "expected 1 or 2 probabilities, got {}",
                    other.len()
                )))
            }
        };
        if !p.is_finite() {
            return Err(InferenceError::InvalidOutput(format!("probability {} is not finite", p)));
        }
        Ok(f64::from(p).clamp(0.0, 1.0))
    }
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("feature_names", &self.feature_names.len())
            .field("version", &self.version)
            .finish()
    }
}
