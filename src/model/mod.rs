//! Model adapter: the loaded estimator and how it gets into memory.
//!
//! The estimator is loaded once at startup ([`load_model`]) and then
//! shared read-only across requests as an `Arc<dyn Estimator>`.

pub mod artifact;
pub mod linear;
pub mod source;
pub mod tree;

pub use artifact::ModelArtifact;
pub use linear::LinearModel;
pub use source::{DEFAULT_MAX_ARTIFACT_BYTES, ModelSource, load_model, load_model_with_limit};
pub use tree::{RegressionTree, TreeEnsemble, TreeValidationError};

use crate::types::FeatureVector;

/// Failure raised by an estimator while predicting.
///
/// Opaque to callers: it carries the cause text and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{cause}")]
pub struct PredictionFailure {
    cause: String,
}

impl PredictionFailure {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }
}

/// A fitted regression model.
///
/// Implementations must be safe to call concurrently; nothing mutates an
/// estimator after it is loaded.
pub trait Estimator: Send + Sync {
    /// Short human-readable description for logs and `/health`.
    fn describe(&self) -> String;

    /// Number of input columns the estimator was fitted on.
    fn n_features(&self) -> usize;

    /// Predict a scalar for a single row.
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionFailure>;
}

/// Reject rows the estimator was not fitted for, then run `f`.
pub(crate) fn predict_checked(
    n_features: usize,
    features: &FeatureVector,
    f: impl FnOnce(&[f64]) -> f64,
) -> Result<f64, PredictionFailure> {
    if n_features != FeatureVector::WIDTH {
        return Err(PredictionFailure::new(format!(
            "X has {} features, but the estimator is expecting {n_features} features as input",
            FeatureVector::WIDTH
        )));
    }
    let y = f(&features.to_row());
    if !y.is_finite() {
        return Err(PredictionFailure::new(format!(
            "estimator produced a non-finite prediction ({y})"
        )));
    }
    Ok(y)
}
