//! predictd error types

/// predictd error types
#[derive(Debug, thiserror::Error)]
pub enum PredictdError {
    // Network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Model errors
    #[error("failed to load model artifact: {0}")]
    Artifact(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Monitoring could not be configured or a record could not be delivered.
    ///
    /// Never surfaced to prediction clients; the sink downgrades or swallows it.
    #[error("monitoring error: {0}")]
    Monitoring(String),
}

impl PredictdError {
    /// Whether the error originated on the network path rather than in local data.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api { .. })
    }
}

impl From<reqwest::Error> for PredictdError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => PredictdError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => PredictdError::Http(err.to_string()),
        }
    }
}

/// Result type alias for predictd operations
pub type Result<T> = std::result::Result<T, PredictdError>;
