//! HTTP client for the model-monitoring backend.
//!
//! Wire contract:
//! - handshake: `GET {host}/v1/models/{model_id}/versions/{model_version}`
//! - logging: `POST {host}/v1/models/{model_id}/versions/{model_version}/predictions`
//!
//! Both carry `Authorization: Bearer {token}`. Logging bodies are the
//! [`MonitoringRecord`] plus the configured `environment`. The model id and
//! version are percent-encoded as single path segments.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::debug;

use super::{MonitoringRecord, MonitoringSettings, PredictionLogger};
use crate::{PredictdError, Result};

/// Client for the remote monitoring backend.
#[derive(Clone)]
pub struct RemoteMonitor {
    token: String,
    http: Client,
    version_url: Url,
    predictions_url: Url,
    environment: String,
}

#[derive(Serialize)]
struct LogPredictionRequest<'a> {
    environment: &'a str,
    #[serde(flatten)]
    record: &'a MonitoringRecord,
}

impl RemoteMonitor {
    /// Validate settings and confirm the model version exists in the backend.
    pub async fn connect(settings: &MonitoringSettings) -> Result<Self> {
        let token = settings
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PredictdError::Monitoring("missing API token".to_string()))?;

        if settings.model_id.trim().is_empty() || settings.model_version.trim().is_empty() {
            return Err(PredictdError::Monitoring(format!(
                "invalid model identity '{}' version '{}'",
                settings.model_id, settings.model_version
            )));
        }

        let host = Url::parse(&settings.host).map_err(|e| {
            PredictdError::Monitoring(format!("invalid monitoring host '{}': {e}", settings.host))
        })?;
        if !matches!(host.scheme(), "http" | "https") {
            return Err(PredictdError::Monitoring(format!(
                "unsupported monitoring host scheme '{}'",
                host.scheme()
            )));
        }

        let version_url = segment_url(
            &host,
            &["v1", "models", &settings.model_id, "versions", &settings.model_version],
        )?;
        let predictions_url = segment_url(&version_url, &["predictions"])?;

        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| PredictdError::Http(format!("failed to build HTTP client: {e}")))?;

        let monitor = Self {
            token,
            http,
            version_url,
            predictions_url,
            environment: settings.environment.clone(),
        };
        monitor.handshake().await?;
        Ok(monitor)
    }

    async fn handshake(&self) -> Result<()> {
        let response = self
            .http
            .get(self.version_url.clone())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PredictdError::Monitoring(format!("handshake failed: {e}")))?;
        Self::check_status(response).await
    }

    async fn check_status(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(PredictdError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Append path segments to `base`, escaping each one.
fn segment_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| PredictdError::Monitoring(format!("monitoring host '{base}' cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl PredictionLogger for RemoteMonitor {
    fn name(&self) -> &str {
        "remote"
    }

    async fn log_prediction(&self, record: &MonitoringRecord) -> Result<()> {
        debug!(id = %record.id, url = %self.predictions_url, "sending prediction record");

        let response = self
            .http
            .post(self.predictions_url.clone())
            .bearer_auth(&self.token)
            .json(&LogPredictionRequest {
                environment: &self.environment,
                record,
            })
            .send()
            .await?;
        Self::check_status(response).await
    }
}
