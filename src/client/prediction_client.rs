//! [`PredictionClient`]: typed HTTP access to a running predictd.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::types::{ErrorDetail, HealthResponse, PredictionRequest, PredictionResult};
use crate::{PredictdError, Result};

/// Client for a predictd instance.
///
/// Non-2xx responses are returned as [`PredictdError::Api`] carrying the
/// server's `detail` text.
#[derive(Clone)]
pub struct PredictionClient {
    http: Client,
    base_url: String,
}

impl PredictionClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PredictdError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Request a prediction.
    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        let response = self
            .http
            .post(format!("{}/api/v1/predict", self.base_url))
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Check service health.
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorDetail>(&body)
            .map(|e| e.detail)
            .unwrap_or(body);
        Err(PredictdError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
