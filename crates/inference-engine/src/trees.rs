//! Gradient-Boosted Tree Ensemble
//!
//! Evaluates a LightGBM binary classifier from its `dump_model()` JSON.
//! Only numerical `<=` splits are supported; the severity model has no
//! categorical inputs.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::classifier::Classifier;
use crate::scaler::ScaledVector;
use crate::{ArtifactError, InferenceError};

/// LightGBM treats |x| <= this as zero for `missing_type = Zero`
const ZERO_THRESHOLD: f64 = 1e-35;

#[derive(Debug, Deserialize)]
struct DumpFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default = "one")]
    num_class: usize,
    objective: String,
    feature_names: Vec<String>,
    #[serde(default)]
    average_output: bool,
    tree_info: Vec<DumpTree>,
}

fn one() -> usize {
    1
}

#[derive(Debug, Deserialize)]
struct DumpTree {
    tree_structure: DumpNode,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpNode {
    Split {
        split_feature: usize,
        threshold: Value,
        decision_type: String,
        default_left: bool,
        #[serde(default)]
        missing_type: Option<String>,
        left_child: Box<DumpNode>,
        right_child: Box<DumpNode>,
    },
    Leaf {
        leaf_value: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingType {
    None,
    Zero,
    NaN,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        default_left: bool,
        missing: MissingType,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// A single tree flattened into an arena; node 0 is the root
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn compile(root: DumpNode, n_features: usize) -> Result<Self, ArtifactError> {
        let mut nodes = Vec::new();
        Self::push(root, n_features, &mut nodes)?;
        Ok(Self { nodes })
    }

    fn push(node: DumpNode, n_features: usize, nodes: &mut Vec<Node>) -> Result<usize, ArtifactError> {
        let index = nodes.len();
        match node {
            DumpNode::Leaf { leaf_value } => {
                nodes.push(Node::Leaf(leaf_value));
            }
            DumpNode::Split {
                split_feature,
                threshold,
                decision_type,
                default_left,
                missing_type,
                left_child,
                right_child,
            } => {
                if decision_type != "<=" {
                    return Err(invalid(format!("unsupported decision type '{}'", decision_type)));
                }
                if split_feature >= n_features {
                    return Err(invalid(format!(
                        "split on feature {} but model has {} features",
                        split_feature, n_features
                    )));
                }
                let threshold = threshold
                    .as_f64()
                    .ok_or_else(|| invalid(format!("non-numeric threshold {}", threshold)))?;
                let missing = match missing_type.as_deref() {
                    None | Some("None") => MissingType::None,
                    Some("Zero") => MissingType::Zero,
                    Some("NaN") => MissingType::NaN,
                    Some(other) => return Err(invalid(format!("unknown missing type '{}'", other))),
                };

                // Children are filled in after they are pushed
                nodes.push(Node::Leaf(0.0));
                let left = Self::push(*left_child, n_features, nodes)?;
                let right = Self::push(*right_child, n_features, nodes)?;
                nodes[index] = Node::Split {
                    feature: split_feature,
                    threshold,
                    default_left,
                    missing,
                    left,
                    right,
                };
            }
        }
        Ok(index)
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    default_left,
                    missing,
                    left,
                    right,
                } => {
                    let mut value = x[feature];
                    if value.is_nan() && missing != MissingType::NaN {
                        value = 0.0;
                    }
                    let is_missing = match missing {
                        MissingType::Zero => value > -ZERO_THRESHOLD && value <= ZERO_THRESHOLD,
                        MissingType::NaN => value.is_nan(),
                        MissingType::None => false,
                    };
                    index = if is_missing {
                        if default_left {
                            left
                        } else {
                            right
                        }
                    } else if value <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn invalid(reason: String) -> ArtifactError {
    ArtifactError::Invalid {
        artifact: "model",
        reason,
    }
}

/// Parse the sigmoid slope out of `binary sigmoid:<k>`
fn parse_sigmoid(objective: &str) -> Result<f64, ArtifactError> {
    let mut parts = objective.split_whitespace();
    match parts.next() {
        Some("binary") => {
            let slope = parts
                .find_map(|p| p.strip_prefix("sigmoid:"))
                .map(|s| s.parse::<f64>())
                .transpose()
                .map_err(|e| invalid(format!("bad sigmoid in objective '{}': {}", objective, e)))?;
            Ok(slope.unwrap_or(1.0))
        }
        Some("cross_entropy") | Some("xentropy") => Ok(1.0),
        _ => Err(invalid(format!("objective '{}' is not a binary classifier", objective))),
    }
}

/// Binary LightGBM classifier
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    feature_names: Vec<String>,
    sigmoid: f64,
    average_output: bool,
    version: Option<String>,
}

impl TreeEnsemble {
    /// Parse a LightGBM `dump_model()` document
    pub fn from_json_str(json: &str) -> Result<Self, ArtifactError> {
        let dump: DumpFile = serde_json::from_str(json).map_err(|e| ArtifactError::Parse {
            artifact: "model",
            reason: e.to_string(),
        })?;

        if dump.num_class != 1 {
            return Err(invalid(format!(
                "expected a binary model, found {} classes",
                dump.num_class
            )));
        }
        let sigmoid = parse_sigmoid(&dump.objective)?;
        if dump.tree_info.is_empty() {
            return Err(invalid("model has no trees".to_string()));
        }

        let n_features = dump.feature_names.len();
        let trees = dump
            .tree_info
            .into_iter()
            .map(|t| Tree::compile(t.tree_structure, n_features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            feature_names: dump.feature_names,
            sigmoid,
            average_output: dump.average_output,
            version: dump.version,
        })
    }

    /// Load a `dump_model()` JSON file
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        info!("Loading model from: {}", path.display());
        let json = fs::read_to_string(path).map_err(|e| ArtifactError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let model = Self::from_json_str(&json)?;
        info!("Loaded {} trees", model.trees.len());
        Ok(model)
    }

    /// Number of trees in the ensemble
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Summed (or averaged) leaf output before the link function
    pub fn raw_score(&self, x: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        if self.average_output {
            sum / self.trees.len() as f64
        } else {
            sum
        }
    }
}

impl Classifier for TreeEnsemble {
    fn kind(&self) -> &'static str {
        "lightgbm"
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn predict_proba(&self, input: &ScaledVector) -> Result<f64, InferenceError> {
        let x = input.as_slice();
        if x.len() != self.feature_names.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.feature_names.len(),
                actual: x.len(),
            });
        }
        let raw = self.raw_score(x);
        Ok(1.0 / (1.0 + (-self.sigmoid * raw).exp()))
    }
}
