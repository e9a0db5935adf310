//! Robust Scaler
//!
//! Replays a scikit-learn `RobustScaler` fitted offline: each column is
//! centred on its training median and divided by its interquartile range.

use std::fs;
use std::path::Path;

use feature_engine::{FeatureVector, FEATURE_COUNT};
use serde::Deserialize;
use tracing::{info, warn};

use crate::ArtifactError;

/// Scaled model input, same shape and order as [`FeatureVector`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledVector {
    values: [f64; FEATURE_COUNT],
}

impl ScaledVector {
    /// Values in canonical order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Values narrowed to `f32` for tensor backends
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|v| *v as f32).collect()
    }
}

impl From<[f64; FEATURE_COUNT]> for ScaledVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }
}

/// On-disk scaler export.
///
/// Accepts both the plain names and the trailing-underscore attribute
/// names scikit-learn uses (`center_`, `scale_`, `feature_names_in_`).
#[derive(Debug, Deserialize)]
struct ScalerFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(alias = "feature_names_in_")]
    feature_names: Vec<String>,
    #[serde(default, alias = "center_")]
    center: Option<Vec<f64>>,
    #[serde(default, alias = "scale_")]
    scale: Option<Vec<f64>>,
}

/// Fitted per-column median/IQR statistics
#[derive(Debug, Clone)]
pub struct RobustScaler {
    feature_names: Vec<String>,
    center: Vec<f64>,
    scale: Vec<f64>,
    version: Option<String>,
}

impl RobustScaler {
    /// Build from fitted statistics.
    ///
    /// The column list must match the canonical schema. `None` for `center`
    /// or `scale` means the scaler was fitted with that step disabled. A
    /// zero or non-finite scale is replaced by 1.0, so the column is only
    /// centred.
    pub fn new(
        feature_names: Vec<String>,
        center: Option<Vec<f64>>,
        scale: Option<Vec<f64>>,
    ) -> Result<Self, ArtifactError> {
        feature_engine::validate_columns("scaler", &feature_names)?;

        let n = feature_names.len();
        let center = center.unwrap_or_else(|| vec![0.0; n]);
        let mut scale = scale.unwrap_or_else(|| vec![1.0; n]);

        if center.len() != n || scale.len() != n {
            return Err(ArtifactError::Invalid {
                artifact: "scaler",
                reason: format!(
                    "{} feature names but {} centers and {} scales",
                    n,
                    center.len(),
                    scale.len()
                ),
            });
        }
        if let Some(i) = center.iter().position(|c| !c.is_finite()) {
            return Err(ArtifactError::Invalid {
                artifact: "scaler",
                reason: format!("center of '{}' is not finite", feature_names[i]),
            });
        }

        for (name, s) in feature_names.iter().zip(scale.iter_mut()) {
            if *s == 0.0 || !s.is_finite() {
                warn!(column = %name, "Scaler column has zero IQR, centering only");
                *s = 1.0;
            }
        }

        Ok(Self {
            feature_names,
            center,
            scale,
            version: None,
        })
    }

    /// Parse a scaler export from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ArtifactError> {
        let file: ScalerFile = serde_json::from_str(json).map_err(|e| ArtifactError::Parse {
            artifact: "scaler",
            reason: e.to_string(),
        })?;
        let mut scaler = Self::new(file.feature_names, file.center, file.scale)?;
        scaler.version = file.version;
        Ok(scaler)
    }

    /// Load a scaler export from disk
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        info!("Loading scaler from: {}", path.display());
        let json = fs::read_to_string(path).map_err(|e| ArtifactError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&json)
    }

    /// Columns the scaler was fitted on, in order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Artifact version tag, if the export carried one
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Centre and scale one vector
    pub fn transform(&self, vector: &FeatureVector) -> ScaledVector {
        let mut values = [0.0; FEATURE_COUNT];
        for (i, (x, out)) in vector.as_slice().iter().zip(values.iter_mut()).enumerate() {
            *out = (x - self.center[i]) / self.scale[i];
        }
        ScaledVector { values }
    }
}
