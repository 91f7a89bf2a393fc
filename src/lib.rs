//! predictd - HTTP prediction service for a pre-trained regression model
//!
//! The crate serves a single estimator behind `POST /api/v1/predict`,
//! classifying failures into client errors (422) and internal errors (500),
//! and optionally forwards every prediction to a model-monitoring backend.
//!
//! # Serving Example
//!
//! ```rust,no_run
//! use predictd::model::{ModelSource, load_model};
//! use predictd::monitoring::MonitoringSink;
//! use predictd::server::{AppState, serve};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> predictd::Result<()> {
//!     let source = ModelSource::parse("https://models.example.com/model.json");
//!     let model = load_model(&source, Duration::from_secs(60)).await?;
//!     let state = AppState::new(model, MonitoringSink::Absent);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     serve(listener, state, std::future::pending()).await
//! }
//! ```
//!
//! # Client Example
//!
//! ```rust,no_run
//! use predictd::client::PredictionClient;
//! use predictd::types::PredictionRequest;
//!
//! #[tokio::main]
//! async fn main() -> predictd::Result<()> {
//!     let client = PredictionClient::new("http://127.0.0.1:8000")?;
//!     let result = client.predict(&PredictionRequest::new("001", 0.5, "c1")).await?;
//!     println!("{}", result.y_pred);
//!     Ok(())
//! }
//! ```

#[cfg(feature = "client")]
pub mod client;
pub mod encoding;
pub mod error;
pub mod model;
pub mod monitoring;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use encoding::{CategoryCode, InvalidCategoryCode, UnknownCategory};
pub use error::{PredictdError, Result};
pub use model::{Estimator, ModelSource, PredictionFailure};
pub use monitoring::{MonitoringRecord, MonitoringSink, PredictionLogger};
pub use types::{FeatureVector, PredictionRequest, PredictionResult};
pub use version::{GIT_BRANCH, GIT_SHA, PKG_VERSION, git_dirty, version_string};
