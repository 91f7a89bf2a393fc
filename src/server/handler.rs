//! Request handlers.
//!
//! A prediction moves through validation, encoding, prediction and
//! best-effort monitoring, in that order. It leaves through one of two
//! failure exits: [`HandlerError::ClientInput`] (422) for anything wrong with
//! the request, or [`HandlerError::Internal`] (500) for anything that went
//! wrong producing the prediction.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error, info};

use super::AppState;
use crate::encoding;
use crate::monitoring::MonitoringRecord;
use crate::telemetry;
use crate::types::{
    ErrorDetail, FeatureVector, HealthResponse, PredictionRequest, PredictionResult,
};

/// Classified prediction failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// Schema violation or unrecognized category.
    #[error("{0}")]
    ClientInput(String),

    /// Any failure while producing the prediction.
    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ClientInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn metric_status(&self) -> &'static str {
        match self {
            Self::ClientInput(_) => "client_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            Self::ClientInput(detail) | Self::Internal(detail) => detail,
        };
        (status, Json(ErrorDetail { detail })).into_response()
    }
}

/// `POST /api/v1/predict`
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, HandlerError> {
    let start = Instant::now();
    let outcome = handle_prediction(&state, payload);

    let status = match &outcome {
        Ok(_) => "ok",
        Err(e) => e.metric_status(),
    };
    metrics::counter!(telemetry::PREDICTIONS_TOTAL, "status" => status).increment(1);
    metrics::histogram!(telemetry::PREDICTION_DURATION_SECONDS, "status" => status)
        .record(start.elapsed().as_secs_f64());

    outcome.map(Json)
}

fn handle_prediction(
    state: &AppState,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<PredictionResult, HandlerError> {
    let Json(request) = payload.map_err(|rejection| {
        let detail = rejection.body_text();
        info!(%detail, "rejected prediction request");
        HandlerError::ClientInput(detail)
    })?;
    request.validate().map_err(|detail| {
        info!(id = %request.id, %detail, "rejected prediction request");
        HandlerError::ClientInput(detail)
    })?;

    let code = encoding::encode(&request.f2).map_err(|e| {
        info!(id = %request.id, f2 = %e.label, "unknown category");
        HandlerError::ClientInput(e.to_string())
    })?;
    let features = FeatureVector::new(request.f1, code);

    let y_pred = invoke_model(state, &features).map_err(|cause| {
        error!(id = %request.id, %cause, "prediction failed");
        HandlerError::Internal(format!("Could not generate prediction - {cause}"))
    })?;
    let result = PredictionResult { y_pred };
    debug!(id = %request.id, y_pred, "prediction generated");

    state
        .monitoring
        .log(MonitoringRecord::new(&request, &features, &result));

    Ok(result)
}

/// Call the estimator, turning panics into failures like any other error.
fn invoke_model(state: &AppState, features: &FeatureVector) -> Result<f64, String> {
    match catch_unwind(AssertUnwindSafe(|| state.model.predict(features))) {
        Ok(Ok(y)) => Ok(y),
        Ok(Err(failure)) => Err(failure.to_string()),
        Err(panic) => Err(panic_message(panic.as_ref())),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "estimator panicked".to_string()
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: state.version.clone(),
        model: state.model.describe(),
        monitoring: state.monitoring.state(),
    })
}
