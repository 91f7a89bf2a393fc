//! Client library for the prediction API.
//!
//! Provides [`PredictionClient`], a typed wrapper over the HTTP endpoints
//! served by predictd.

mod prediction_client;

pub use prediction_client::PredictionClient;
