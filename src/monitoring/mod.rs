//! Best-effort prediction monitoring.
//!
//! The sink is resolved once at startup into one of two states and never
//! changes afterwards:
//!
//! - [`MonitoringSink::Absent`]: nothing configured; logging is a no-op.
//! - [`MonitoringSink::Configured`]: each record is handed to a
//!   [`PredictionLogger`] on a spawned task.
//!
//! Monitoring is never on the critical path. Configuration failures
//! downgrade to `Absent` and delivery failures are logged and counted,
//! never returned to the request that produced the record.

mod record;
pub mod remote;

pub use record::{MonitoringRecord, RecordFeatures, RecordPredictions, RecordRawInputs};
pub use remote::RemoteMonitor;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::Result;
use crate::telemetry;
use crate::types::MonitoringState;

/// Default monitoring environment label.
pub const DEFAULT_ENVIRONMENT: &str = "local-dev";

/// Backend that accepts prediction records.
#[async_trait]
pub trait PredictionLogger: Send + Sync {
    /// Backend name for logging/debugging.
    fn name(&self) -> &str;

    /// Deliver one record. Called at most once per record.
    async fn log_prediction(&self, record: &MonitoringRecord) -> Result<()>;
}

/// Everything needed to attempt monitoring configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringSettings {
    /// API token; monitoring is skipped when missing.
    pub token: Option<String>,
    /// Backend base URL.
    pub host: String,
    /// Environment label attached to every record.
    pub environment: String,
    /// Identity of the served model in the backend.
    pub model_id: String,
    pub model_version: String,
    /// Per-request timeout for backend calls.
    pub timeout: Duration,
}

/// Optional monitoring capability shared by all requests.
#[derive(Clone, Default)]
pub enum MonitoringSink {
    #[default]
    Absent,
    Configured { logger: Arc<dyn PredictionLogger> },
}

impl MonitoringSink {
    /// Wrap an already configured logger.
    pub fn configured(logger: Arc<dyn PredictionLogger>) -> Self {
        Self::Configured { logger }
    }

    /// Attempt to configure the remote backend, degrading to `Absent` on
    /// any failure.
    pub async fn configure(settings: &MonitoringSettings) -> Self {
        if settings.token.as_deref().is_none_or(str::is_empty) {
            warn!("could not find required APORIA_TOKEN; prediction monitoring disabled");
            return Self::Absent;
        }

        match RemoteMonitor::connect(settings).await {
            Ok(monitor) => {
                info!(
                    host = %settings.host,
                    environment = %settings.environment,
                    model_id = %settings.model_id,
                    model_version = %settings.model_version,
                    "prediction monitoring configured"
                );
                Self::configured(Arc::new(monitor))
            }
            Err(e) => {
                warn!(error = %e, "could not configure monitoring client; prediction monitoring disabled");
                Self::Absent
            }
        }
    }

    pub fn state(&self) -> MonitoringState {
        match self {
            Self::Absent => MonitoringState::Absent,
            Self::Configured { .. } => MonitoringState::Configured,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured { .. })
    }

    /// Fire-and-forget delivery of one record.
    ///
    /// Returns the delivery task handle when a logger is configured. The
    /// task never fails: delivery errors are logged and counted inside it.
    /// Must be called within a tokio runtime.
    pub fn log(&self, record: MonitoringRecord) -> Option<JoinHandle<()>> {
        let Self::Configured { logger } = self else {
            return None;
        };
        let logger = Arc::clone(logger);

        Some(tokio::spawn(async move {
            match logger.log_prediction(&record).await {
                Ok(()) => {
                    metrics::counter!(telemetry::MONITORING_RECORDS_TOTAL).increment(1);
                    debug!(id = %record.id, logger = logger.name(), "prediction logged");
                }
                Err(e) => {
                    metrics::counter!(telemetry::MONITORING_FAILURES_TOTAL).increment(1);
                    warn!(
                        id = %record.id,
                        logger = logger.name(),
                        error = %e,
                        "failed to log prediction to monitoring"
                    );
                }
            }
        }))
    }
}

impl std::fmt::Debug for MonitoringSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Configured { logger } => f
                .debug_struct("Configured")
                .field("logger", &logger.name())
                .finish(),
        }
    }
}
