//! Serialized estimator format.
//!
//! Artifacts are JSON documents tagged by `kind`:
//!
//! ```json
//! {"kind": "linear", "n_features": 2, "coefficients": [0.4, 0.2], "intercept": 0.1}
//! ```
//!
//! ```json
//! {
//!   "kind": "tree_ensemble",
//!   "n_features": 2,
//!   "base_score": 0.5,
//!   "trees": [
//!     {"nodes": [
//!       {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
//!       {"leaf": -0.1},
//!       {"leaf": 0.3}
//!     ]}
//!   ]
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Estimator, LinearModel, RegressionTree, TreeEnsemble};
use crate::types::FeatureVector;
use crate::{PredictdError, Result};

/// A serialized estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear {
        n_features: usize,
        coefficients: Vec<f64>,
        intercept: f64,
    },
    TreeEnsemble {
        n_features: usize,
        #[serde(default)]
        base_score: f64,
        trees: Vec<TreeArtifact>,
    },
}

/// One tree of a `tree_ensemble` artifact; node `0` is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub nodes: Vec<NodeArtifact>,
}

/// A split or a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeArtifact {
    Split {
        feature: u32,
        threshold: f64,
        left: u32,
        right: u32,
    },
    Leaf {
        leaf: f64,
    },
}

impl ModelArtifact {
    /// Parse an artifact from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| PredictdError::Artifact(format!("failed to parse model artifact: {e}")))
    }

    /// Number of input columns the artifact declares.
    pub fn n_features(&self) -> usize {
        match self {
            Self::Linear { n_features, .. } | Self::TreeEnsemble { n_features, .. } => *n_features,
        }
    }

    /// Validate the artifact and build the estimator it describes.
    pub fn into_estimator(self) -> Result<Arc<dyn Estimator>> {
        let n_features = self.n_features();
        if n_features != FeatureVector::WIDTH {
            return Err(PredictdError::InvalidModel(format!(
                "model expects {n_features} features, requests provide {}",
                FeatureVector::WIDTH
            )));
        }

        match self {
            Self::Linear {
                coefficients,
                intercept,
                ..
            } => {
                if coefficients.len() != n_features {
                    return Err(PredictdError::InvalidModel(format!(
                        "linear model has {} coefficients for {n_features} features",
                        coefficients.len()
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(PredictdError::InvalidModel(
                        "linear model contains non-finite parameters".to_string(),
                    ));
                }
                Ok(Arc::new(LinearModel::new(coefficients, intercept)))
            }
            Self::TreeEnsemble {
                base_score, trees, ..
            } => {
                if !base_score.is_finite() {
                    return Err(PredictdError::InvalidModel(
                        "tree ensemble base_score is not finite".to_string(),
                    ));
                }
                let trees = trees.into_iter().map(TreeArtifact::into_tree).collect();
                let ensemble = TreeEnsemble::new(trees, base_score, n_features).map_err(
                    |(idx, e)| PredictdError::InvalidModel(format!("tree {idx}: {e}")),
                )?;
                Ok(Arc::new(ensemble))
            }
        }
    }
}

impl TreeArtifact {
    fn into_tree(self) -> RegressionTree {
        let n = self.nodes.len();
        let mut split_features = Vec::with_capacity(n);
        let mut thresholds = Vec::with_capacity(n);
        let mut left_children = Vec::with_capacity(n);
        let mut right_children = Vec::with_capacity(n);
        let mut is_leaf = Vec::with_capacity(n);
        let mut leaf_values = Vec::with_capacity(n);

        for node in self.nodes {
            match node {
                NodeArtifact::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    split_features.push(feature);
                    thresholds.push(threshold);
                    left_children.push(left);
                    right_children.push(right);
                    is_leaf.push(false);
                    leaf_values.push(0.0);
                }
                NodeArtifact::Leaf { leaf } => {
                    split_features.push(0);
                    thresholds.push(0.0);
                    left_children.push(0);
                    right_children.push(0);
                    is_leaf.push(true);
                    leaf_values.push(leaf);
                }
            }
        }

        RegressionTree::new(
            split_features,
            thresholds,
            left_children,
            right_children,
            is_leaf,
            leaf_values,
        )
    }
}
