//! Snapshot of one prediction for the monitoring backend.

use serde::{Deserialize, Serialize};

use crate::encoding::CategoryCode;
use crate::types::{FeatureVector, PredictionRequest, PredictionResult};

/// Denormalized record of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringRecord {
    /// Request identifier supplied by the client.
    pub id: String,
    /// Inputs as the model saw them.
    pub raw_inputs: RecordRawInputs,
    /// Inputs as the client sent them.
    pub features: RecordFeatures,
    pub predictions: RecordPredictions,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordRawInputs {
    #[serde(rename = "F_1")]
    pub f1: f64,
    #[serde(rename = "F_2")]
    pub f2: CategoryCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFeatures {
    #[serde(rename = "F_1")]
    pub f1: f64,
    #[serde(rename = "F_2")]
    pub f2: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordPredictions {
    pub y_pred: f64,
}

impl MonitoringRecord {
    pub fn new(
        request: &PredictionRequest,
        features: &FeatureVector,
        result: &PredictionResult,
    ) -> Self {
        Self {
            id: request.id.clone(),
            raw_inputs: RecordRawInputs {
                f1: features.f1,
                f2: features.f2,
            },
            features: RecordFeatures {
                f1: request.f1,
                f2: request.f2.clone(),
            },
            predictions: RecordPredictions {
                y_pred: result.y_pred,
            },
        }
    }
}
