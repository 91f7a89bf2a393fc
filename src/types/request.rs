//! Wire types for `POST /api/v1/predict`.

use serde::{Deserialize, Serialize};

/// A single prediction request.
///
/// `f2` is kept as the raw label; it is only encoded once the request
/// has passed schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Opaque request identifier, forwarded to monitoring.
    pub id: String,
    /// Numeric feature.
    pub f1: f64,
    /// Categorical feature label.
    pub f2: String,
}

impl PredictionRequest {
    pub fn new(id: impl Into<String>, f1: f64, f2: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            f1,
            f2: f2.into(),
        }
    }

    /// Constraints serde cannot express on its own.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("field `id` must be a non-empty string".to_string());
        }
        if !self.f1.is_finite() {
            return Err("field `f1` must be a finite number".to_string());
        }
        Ok(())
    }
}

/// Successful prediction response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub y_pred: f64,
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_valid_payload() {
        let req: PredictionRequest =
            serde_json::from_str(r#"{"id": "001", "f1": 0.5, "f2": "c1"}"#).unwrap();
        assert_eq!(req, PredictionRequest::new("001", 0.5, "c1"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn integer_f1_is_accepted() {
        let req: PredictionRequest =
            serde_json::from_str(r#"{"id": "001", "f1": 3, "f2": "c0"}"#).unwrap();
        assert_eq!(req.f1, 3.0);
    }

    #[test]
    fn missing_field_fails_to_parse() {
        let result = serde_json::from_str::<PredictionRequest>(r#"{"id": "001", "f1": 0.5}"#);
        assert!(result.unwrap_err().to_string().contains("f2"));
    }

    #[test]
    fn mistyped_field_fails_to_parse() {
        let result =
            serde_json::from_str::<PredictionRequest>(r#"{"id": 1, "f1": 0.5, "f2": "c1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_id_fails_validation() {
        let req = PredictionRequest::new("", 0.5, "c1");
        assert!(req.validate().unwrap_err().contains("id"));
    }

    #[test]
    fn result_uses_y_pred_field() {
        let json = serde_json::to_value(PredictionResult { y_pred: 1.5 }).unwrap();
        assert_eq!(json, serde_json::json!({"y_pred": 1.5}));
    }
}
