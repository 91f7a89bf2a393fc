//! Public types for the prediction API.

mod features;
mod health;
mod request;

pub use features::FeatureVector;
pub use health::{HealthResponse, MonitoringState};
pub use request::{ErrorDetail, PredictionRequest, PredictionResult};
