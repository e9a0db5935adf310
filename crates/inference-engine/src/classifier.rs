//! Classifier seam shared by the native tree evaluator and ONNX backend

use crate::scaler::ScaledVector;
use crate::InferenceError;

/// A fitted binary severity classifier
pub trait Classifier: Send + Sync {
    /// Short backend name for logs and health output
    fn kind(&self) -> &'static str;

    /// Input columns the model was trained on, in order
    fn feature_names(&self) -> &[String];

    /// Artifact version tag, if the export carried one
    fn version(&self) -> Option<&str> {
        None
    }

    /// Probability of the positive (severe) class
    fn predict_proba(&self, input: &ScaledVector) -> Result<f64, InferenceError>;
}
