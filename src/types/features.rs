//! Model input row.

use serde::Serialize;

use crate::encoding::CategoryCode;

/// One row of model input: `f1` followed by the encoded `f2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub f1: f64,
    pub f2: CategoryCode,
}

impl FeatureVector {
    /// Number of columns every estimator must accept.
    pub const WIDTH: usize = 2;

    pub fn new(f1: f64, f2: CategoryCode) -> Self {
        Self { f1, f2 }
    }

    /// Columns in model order.
    pub fn to_row(&self) -> [f64; Self::WIDTH] {
        [self.f1, self.f2.as_feature()]
    }
}
