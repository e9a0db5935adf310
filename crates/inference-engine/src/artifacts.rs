//! Fitted Artifact Loading
//!
//! The scaler and classifier are loaded together and both checked against
//! the canonical schema before either is used.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::onnx::OnnxClassifier;
use crate::scaler::RobustScaler;
use crate::trees::TreeEnsemble;
use crate::ArtifactError;

/// Serialized classifier format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    /// LightGBM `dump_model()` JSON
    #[default]
    LightgbmJson,
    /// ONNX graph plus a JSON column list
    Onnx,
}

/// Where the fitted artifacts live on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub scaler_path: PathBuf,
    pub model_path: PathBuf,
    pub model_format: ModelFormat,
    /// Column list for ONNX models
    pub model_columns_path: Option<PathBuf>,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            scaler_path: PathBuf::from("models/robust_scaler.json"),
            model_path: PathBuf::from("models/lgbm_severity.json"),
            model_format: ModelFormat::LightgbmJson,
            model_columns_path: None,
        }
    }
}

/// Scaler and classifier, validated against each other and the schema
#[derive(Clone)]
pub struct FittedArtifacts {
    pub scaler: Arc<RobustScaler>,
    pub classifier: Arc<dyn Classifier>,
}

impl FittedArtifacts {
    /// Pair a scaler with a classifier after checking both column lists
    pub fn new(scaler: RobustScaler, classifier: Arc<dyn Classifier>) -> Result<Self, ArtifactError> {
        // The scaler is checked on construction; LightGBM dumps often carry
        // `Column_<i>` placeholders, so only the count is binding for those.
        let names = classifier.feature_names();
        if names.iter().enumerate().all(|(i, n)| *n == format!("Column_{}", i)) {
            warn!("Model has placeholder column names, checking count only");
            if names.len() != scaler.feature_names().len() {
                return Err(feature_engine::SchemaError::ColumnCount {
                    artifact: "model".to_string(),
                    expected: scaler.feature_names().len(),
                    actual: names.len(),
                }
                .into());
            }
        } else {
            feature_engine::validate_columns("model", names)?;
        }

        info!(
            scaler_version = scaler.version().unwrap_or("unversioned"),
            model_kind = classifier.kind(),
            model_version = classifier.version().unwrap_or("unversioned"),
            "Fitted artifacts validated"
        );

        Ok(Self {
            scaler: Arc::new(scaler),
            classifier,
        })
    }

    /// Load both artifacts from disk
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let scaler = RobustScaler::load(&paths.scaler_path)?;
        let classifier: Arc<dyn Classifier> = match paths.model_format {
            ModelFormat::LightgbmJson => Arc::new(TreeEnsemble::load(&paths.model_path)?),
            ModelFormat::Onnx => {
                let columns = paths
                    .model_columns_path
                    .clone()
                    .unwrap_or_else(|| sidecar_path(&paths.model_path));
                Arc::new(OnnxClassifier::load(&paths.model_path, &columns)?)
            }
        };
        Self::new(scaler, classifier)
    }
}

/// `model.onnx` -> `model.columns.json`
fn sidecar_path(model_path: &Path) -> PathBuf {
    model_path.with_extension("columns.json")
}

impl std::fmt::Debug for FittedArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FittedArtifacts")
            .field("scaler", &self.scaler.version())
            .field("classifier", &self.classifier.kind())
            .finish()
    }
}
