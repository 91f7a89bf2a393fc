//! Wire type for `GET /health`.

use serde::{Deserialize, Serialize};

/// Whether predictions are being forwarded to the monitoring backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringState {
    Configured,
    Absent,
}

/// Liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    /// Short description of the loaded estimator.
    pub model: String,
    pub monitoring: MonitoringState,
}
