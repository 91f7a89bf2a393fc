//! Linear regression estimator.

use super::{Estimator, PredictionFailure, predict_checked};
use crate::types::FeatureVector;

/// `y = intercept + sum(coefficients[i] * x[i])`
///
/// ```
/// use predictd::encoding::encode;
/// use predictd::model::{Estimator, LinearModel};
/// use predictd::types::FeatureVector;
///
/// let model = LinearModel::new(vec![2.0, 0.5], 1.0);
/// let y = model.predict(&FeatureVector::new(0.5, encode("c2").unwrap())).unwrap();
/// assert_eq!(y, 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    coefficients: Box<[f64]>,
    intercept: f64,
}

impl LinearModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients: coefficients.into_boxed_slice(),
            intercept,
        }
    }

    #[inline]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    #[inline]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Estimator for LinearModel {
    fn describe(&self) -> String {
        format!("linear({} features)", self.coefficients.len())
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionFailure> {
        predict_checked(self.n_features(), features, |row| {
            self.coefficients
                .iter()
                .zip(row)
                .fold(self.intercept, |acc, (w, x)| acc + w * x)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode;

    #[test]
    fn predicts_weighted_sum() {
        let model = LinearModel::new(vec![0.5, 0.25], 0.125);
        let y = model
            .predict(&FeatureVector::new(1.0, encode("c1").unwrap()))
            .unwrap();
        assert_eq!(y, 0.875);
    }

    #[test]
    fn width_mismatch_is_a_prediction_failure() {
        let model = LinearModel::new(vec![0.5, 0.25, 1.0], 0.0);
        let err = model
            .predict(&FeatureVector::new(1.0, encode("c1").unwrap()))
            .unwrap_err();
        assert!(err.cause().contains("expecting 3 features"));
    }

    #[test]
    fn overflow_is_a_prediction_failure() {
        let model = LinearModel::new(vec![f64::MAX, f64::MAX], f64::MAX);
        let err = model
            .predict(&FeatureVector::new(2.0, encode("c2").unwrap()))
            .unwrap_err();
        assert!(err.cause().contains("non-finite"));
    }
}
