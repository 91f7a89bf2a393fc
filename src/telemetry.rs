//! Telemetry metric name constants.
//!
//! Centralised metric names for predictd operations. The daemon does not
//! install a recorder; embedders install their own `metrics` recorder (e.g.
//! prometheus, statsd). Without a recorder installed, all metric calls are
//! no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `predictd_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `status`: request outcome, one of "ok", "client_error", "internal_error"

/// Total prediction requests handled, including rejected ones.
///
/// Labels: `status` ("ok" | "client_error" | "internal_error").
pub const PREDICTIONS_TOTAL: &str = "predictd_predictions_total";

/// Prediction handler duration in seconds, excluding monitoring delivery.
///
/// Labels: `status`.
pub const PREDICTION_DURATION_SECONDS: &str = "predictd_prediction_duration_seconds";

/// Total monitoring records delivered to the backend.
pub const MONITORING_RECORDS_TOTAL: &str = "predictd_monitoring_records_total";

/// Total monitoring records that failed to deliver.
pub const MONITORING_FAILURES_TOTAL: &str = "predictd_monitoring_failures_total";
