use predictd::{PredictdError, Result, UnknownCategory};

#[test]
fn test_error_display() {
    let err = PredictdError::Artifact("model fetch returned HTTP 404".to_string());
    assert!(err.to_string().contains("404"));
    assert!(err.to_string().starts_with("failed to load model artifact"));
}

#[test]
fn test_api_error_display() {
    let err = PredictdError::Api {
        status: 422,
        message: "Unknown category provided for f2 - 'c4'".into(),
    };
    assert_eq!(
        err.to_string(),
        "API error (422): Unknown category provided for f2 - 'c4'"
    );
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(PredictdError::Configuration("missing".into()))
    }
    assert!(returns_error().is_err());
}

#[test]
fn test_json_error_conversion() {
    fn parse() -> Result<serde_json::Value> {
        Ok(serde_json::from_str("{not json")?)
    }
    assert!(matches!(parse(), Err(PredictdError::Json(_))));
}

#[test]
fn network_errors_are_classified() {
    assert!(PredictdError::Http("connection reset".into()).is_network());
    assert!(
        PredictdError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_network()
    );
    assert!(!PredictdError::InvalidModel("bad tree".into()).is_network());
    assert!(!PredictdError::Monitoring("no token".into()).is_network());
}

#[test]
fn unknown_category_names_the_label() {
    let err = UnknownCategory {
        label: "c4".to_string(),
    };
    assert_eq!(err.to_string(), "Unknown category provided for f2 - 'c4'");
}
