//! HTTP server for the prediction API.
//!
//! This module provides:
//! - The request handlers (`handler`)
//! - Configuration types (`config`)
//! - Shared application state and the startup lifecycle ([`AppState`])
//!
//! State is built once before serving begins and is read-only afterwards.

pub mod config;
pub mod handler;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::model::{Estimator, load_model_with_limit};
use crate::monitoring::MonitoringSink;
use crate::{PredictdError, Result};
use config::{Config, Secrets};

pub use handler::HandlerError;

/// Route for predictions.
pub const PREDICT_PATH: &str = "/api/v1/predict";
/// Route for liveness checks.
pub const HEALTH_PATH: &str = "/health";

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn Estimator>,
    pub monitoring: MonitoringSink,
    pub version: String,
}

impl AppState {
    pub fn new(model: Arc<dyn Estimator>, monitoring: MonitoringSink) -> Self {
        Self {
            model,
            monitoring,
            version: crate::version_string(),
        }
    }

    /// Run the startup lifecycle: load the model (fatal on failure), then
    /// attempt monitoring configuration (degrades to absent on failure).
    pub async fn bootstrap(
        config: &Config,
        secrets: &Secrets,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let source = config.model_source()?;
        let model =
            load_model_with_limit(&source, config.fetch_timeout(), config.model.max_artifact_bytes)
                .await?;

        let settings = config.monitoring_settings(secrets, env);
        let monitoring = MonitoringSink::configure(&settings).await;

        Ok(Self::new(model, monitoring))
    }
}

/// Build the router for the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(PREDICT_PATH, post(handler::predict))
        .route(HEALTH_PATH, get(handler::health))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(
        %addr,
        model = %state.model.describe(),
        monitoring = ?state.monitoring.state(),
        "prediction server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| PredictdError::Http(format!("server error: {e}")))
}
