//! Integration tests for model artifact loading and the startup lifecycle.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use predictd::PredictdError;
use predictd::encoding::encode;
use predictd::model::{ModelSource, load_model, load_model_with_limit};
use predictd::types::FeatureVector;

const TIMEOUT: Duration = Duration::from_secs(5);

const LINEAR_ARTIFACT: &str =
    r#"{"kind": "linear", "n_features": 2, "coefficients": [0.5, 0.25], "intercept": 0.125}"#;

const TREE_ARTIFACT: &str = r#"{
    "kind": "tree_ensemble",
    "n_features": 2,
    "base_score": 1.0,
    "trees": [
        {"nodes": [
            {"feature": 0, "threshold": 0.0, "left": 1, "right": 2},
            {"leaf": -1.0},
            {"feature": 1, "threshold": 1.5, "left": 3, "right": 4},
            {"leaf": 0.5},
            {"leaf": 2.0}
        ]},
        {"nodes": [{"leaf": 0.25}]}
    ]
}"#;

async fn serve_artifact(body: &str, status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models/model.json"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn row(f1: f64, f2: &str) -> FeatureVector {
    FeatureVector::new(f1, encode(f2).unwrap())
}

// =============================================================================
// Remote artifacts
// =============================================================================

#[tokio::test]
async fn loads_linear_model_over_http() {
    let server = serve_artifact(LINEAR_ARTIFACT, 200).await;
    let source = ModelSource::parse(&format!("{}/models/model.json", server.uri()));

    let model = load_model(&source, TIMEOUT).await.unwrap();
    assert_eq!(model.n_features(), 2);
    assert_eq!(model.predict(&row(1.0, "c1")).unwrap(), 0.875);
}

#[tokio::test]
async fn loads_tree_ensemble_over_http() {
    let server = serve_artifact(TREE_ARTIFACT, 200).await;
    let source = ModelSource::remote(format!("{}/models/model.json", server.uri()));

    let model = load_model(&source, TIMEOUT).await.unwrap();
    assert_eq!(model.describe(), "tree_ensemble(2 trees, 2 features)");
    assert_eq!(model.predict(&row(-1.0, "c2")).unwrap(), 0.25);
    assert_eq!(model.predict(&row(1.0, "c0")).unwrap(), 1.75);
    assert_eq!(model.predict(&row(1.0, "c2")).unwrap(), 3.25);
}

#[tokio::test]
async fn http_error_fails_load() {
    let server = serve_artifact("not found", 404).await;
    let source = ModelSource::remote(format!("{}/models/model.json", server.uri()));

    let err = load_model(&source, TIMEOUT).await.err().unwrap();
    assert!(matches!(err, PredictdError::Artifact(_)));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn corrupt_artifact_fails_load() {
    let server = serve_artifact("\u{0}\u{1}joblib-bytes", 200).await;
    let source = ModelSource::remote(format!("{}/models/model.json", server.uri()));

    let err = load_model(&source, TIMEOUT).await.err().unwrap();
    assert!(err.to_string().contains("failed to parse model artifact"));
}

#[tokio::test]
async fn slow_artifact_host_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(LINEAR_ARTIFACT)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let source = ModelSource::remote(format!("{}/models/model.json", server.uri()));

    let result = load_model(&source, Duration::from_millis(200)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn oversized_remote_artifact_fails_load() {
    let server = serve_artifact(LINEAR_ARTIFACT, 200).await;
    let source = ModelSource::remote(format!("{}/models/model.json", server.uri()));

    let err = load_model_with_limit(&source, TIMEOUT, 16)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, PredictdError::Artifact(_)));
    assert!(err.to_string().contains("over the 16 byte limit"));
}

#[tokio::test]
async fn artifact_at_limit_loads() {
    let server = serve_artifact(LINEAR_ARTIFACT, 200).await;
    let source = ModelSource::remote(format!("{}/models/model.json", server.uri()));

    let model = load_model_with_limit(&source, TIMEOUT, LINEAR_ARTIFACT.len() as u64)
        .await
        .unwrap();
    assert_eq!(model.n_features(), 2);
}

// =============================================================================
// Local artifacts
// =============================================================================

#[tokio::test]
async fn loads_model_from_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("model.json");
    std::fs::write(&artifact, LINEAR_ARTIFACT).unwrap();

    let source = ModelSource::parse(&format!("file://{}", artifact.display()));
    let model = load_model(&source, TIMEOUT).await.unwrap();
    assert_eq!(model.predict(&row(0.0, "c0")).unwrap(), 0.125);
}

#[tokio::test]
async fn invalid_local_model_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("model.json");
    std::fs::write(
        &artifact,
        r#"{"kind": "linear", "n_features": 2, "coefficients": [1.0], "intercept": 0.0}"#,
    )
    .unwrap();

    let err = load_model(&ModelSource::local(&artifact), TIMEOUT)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, PredictdError::InvalidModel(_)));
}

// =============================================================================
// Startup lifecycle
// =============================================================================

#[cfg(feature = "server")]
mod bootstrap {
    use super::*;

    use predictd::server::AppState;
    use predictd::server::config::{Config, Secrets};
    use predictd::types::MonitoringState;

    fn config_for(source: Option<String>) -> Config {
        let mut config = Config::default();
        config.model.source = source;
        config.model.fetch_timeout_secs = 5;
        config
    }

    #[tokio::test]
    async fn bootstrap_without_token_serves_without_monitoring() {
        let server = serve_artifact(LINEAR_ARTIFACT, 200).await;
        let config = config_for(Some(format!("{}/models/model.json", server.uri())));

        let state = AppState::bootstrap(&config, &Secrets::default(), |_| None)
            .await
            .unwrap();
        assert_eq!(state.monitoring.state(), MonitoringState::Absent);
        assert_eq!(state.model.describe(), "linear(2 features)");
    }

    #[tokio::test]
    async fn bootstrap_with_broken_monitoring_still_starts() {
        let server = serve_artifact(LINEAR_ARTIFACT, 200).await;
        let config = config_for(Some(format!("{}/models/model.json", server.uri())));

        // The artifact server has no monitoring routes, so the handshake 404s.
        let monitoring_host = server.uri();
        let state = AppState::bootstrap(&config, &Secrets::default(), move |key| match key {
            "APORIA_TOKEN" => Some("token".to_string()),
            "APORIA_HOST" => Some(monitoring_host.clone()),
            _ => None,
        })
        .await
        .unwrap();
        assert_eq!(state.monitoring.state(), MonitoringState::Absent);
    }

    #[tokio::test]
    async fn bootstrap_fails_when_model_cannot_be_fetched() {
        let server = serve_artifact("gone", 500).await;
        let config = config_for(Some(format!("{}/models/model.json", server.uri())));

        let result = AppState::bootstrap(&config, &Secrets::default(), |_| None).await;
        assert!(matches!(result, Err(PredictdError::Artifact(_))));
    }

    #[tokio::test]
    async fn bootstrap_enforces_configured_artifact_limit() {
        let server = serve_artifact(LINEAR_ARTIFACT, 200).await;
        let mut config = config_for(Some(format!("{}/models/model.json", server.uri())));
        config.model.max_artifact_bytes = 8;

        let result = AppState::bootstrap(&config, &Secrets::default(), |_| None).await;
        assert!(matches!(result, Err(PredictdError::Artifact(_))));
    }

    #[tokio::test]
    async fn bootstrap_fails_without_model_source() {
        let result = AppState::bootstrap(&config_for(None), &Secrets::default(), |_| None).await;
        assert!(matches!(result, Err(PredictdError::Configuration(_))));
    }
}
