//! Model source and download logic.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use super::{Estimator, ModelArtifact};
use crate::{PredictdError, Result};

/// Largest artifact accepted when no limit is configured (64 MiB).
pub const DEFAULT_MAX_ARTIFACT_BYTES: u64 = 64 * 1024 * 1024;

/// Where the serialized estimator lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Fetch over HTTP(S) with a plain GET.
    Remote {
        /// Artifact URL.
        url: String,
    },

    /// Read from the local filesystem.
    Local {
        /// Path to the artifact file.
        path: PathBuf,
    },
}

impl ModelSource {
    /// Create a remote source.
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote { url: url.into() }
    }

    /// Create a local source.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local { path: path.into() }
    }

    /// Interpret a configured location: `http(s)://` URLs are remote,
    /// `file://` URLs and bare paths are local.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::remote(location)
        } else if let Some(path) = location.strip_prefix("file://") {
            Self::local(path)
        } else {
            Self::local(location)
        }
    }

    /// Read the raw artifact bytes, refusing anything over `max_bytes`.
    pub async fn fetch(&self, timeout: Duration, max_bytes: u64) -> Result<Vec<u8>> {
        match self {
            Self::Remote { url } => {
                let http = reqwest::Client::builder()
                    .timeout(timeout)
                    .build()
                    .map_err(|e| PredictdError::Http(format!("failed to build HTTP client: {e}")))?;

                let mut response = http.get(url).send().await.map_err(|e| {
                    PredictdError::Artifact(format!("failed to fetch model from {url}: {e}"))
                })?;

                if !response.status().is_success() {
                    return Err(PredictdError::Artifact(format!(
                        "model fetch from {url} returned HTTP {}",
                        response.status()
                    )));
                }

                if let Some(len) = response.content_length() {
                    check_size(len, max_bytes)?;
                }

                // Content-Length may be absent or wrong; enforce while reading.
                let mut body = Vec::new();
                while let Some(chunk) = response.chunk().await.map_err(|e| {
                    PredictdError::Artifact(format!("failed to read model response body: {e}"))
                })? {
                    check_size((body.len() + chunk.len()) as u64, max_bytes)?;
                    body.extend_from_slice(&chunk);
                }
                Ok(body)
            }
            Self::Local { path } => {
                let read_error = |e: std::io::Error| {
                    PredictdError::Artifact(format!(
                        "failed to read model file {}: {e}",
                        path.display()
                    ))
                };
                let metadata = tokio::fs::metadata(path).await.map_err(read_error)?;
                check_size(metadata.len(), max_bytes)?;
                tokio::fs::read(path).await.map_err(read_error)
            }
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { url } => f.write_str(url),
            Self::Local { path } => write!(f, "{}", path.display()),
        }
    }
}

fn check_size(len: u64, max_bytes: u64) -> Result<()> {
    if len > max_bytes {
        return Err(PredictdError::Artifact(format!(
            "model artifact is {len} bytes, over the {max_bytes} byte limit"
        )));
    }
    Ok(())
}

/// Fetch, parse and validate the estimator with the default size limit.
///
/// Any failure here means the process cannot serve; callers treat it as
/// fatal.
pub async fn load_model(source: &ModelSource, timeout: Duration) -> Result<Arc<dyn Estimator>> {
    load_model_with_limit(source, timeout, DEFAULT_MAX_ARTIFACT_BYTES).await
}

/// [`load_model`] with an explicit artifact size limit.
pub async fn load_model_with_limit(
    source: &ModelSource,
    timeout: Duration,
    max_bytes: u64,
) -> Result<Arc<dyn Estimator>> {
    let loaded = async {
        let bytes = source.fetch(timeout, max_bytes).await?;
        ModelArtifact::from_slice(&bytes)?.into_estimator()
    }
    .await;

    match loaded {
        Ok(model) => {
            info!(source = %source, model = %model.describe(), "ML model loaded into memory");
            Ok(model)
        }
        Err(e) => {
            error!(source = %source, error = %e, "could not fetch and/or load model");
            Err(e)
        }
    }
}
