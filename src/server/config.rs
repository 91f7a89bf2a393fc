//! Configuration loading for predictd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.predictd/config.toml` (user)
//! 3. `/etc/predictd/config.toml` (system)
//! 4. built-in defaults
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.predictd/secrets.toml` (user, must be 0600)
//! 2. `/etc/predictd/secrets.toml` (system, must be 0600)
//!
//! Monitoring settings may be overridden from the environment:
//! `APORIA_TOKEN`, `APORIA_HOST` and `APORIA_ENVIRONMENT`.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::model::{DEFAULT_MAX_ARTIFACT_BYTES, ModelSource};
use crate::monitoring::{DEFAULT_ENVIRONMENT, MonitoringSettings};
use crate::{PredictdError, Result};

/// Environment variable holding the monitoring API token.
pub const TOKEN_ENV_VAR: &str = "APORIA_TOKEN";
/// Environment variable overriding the monitoring host.
pub const HOST_ENV_VAR: &str = "APORIA_HOST";
/// Environment variable overriding the monitoring environment label.
pub const ENVIRONMENT_ENV_VAR: &str = "APORIA_ENVIRONMENT";

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:8000).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "0.0.0.0:8000".to_string()
}

/// Model artifact configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Artifact URL or path. Required before serving.
    #[serde(default)]
    pub source: Option<String>,
    /// Artifact download timeout in seconds (default: 60).
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Largest accepted artifact in bytes (default: 64 MiB).
    #[serde(default = "default_max_artifact_bytes")]
    pub max_artifact_bytes: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            source: None,
            fetch_timeout_secs: default_fetch_timeout(),
            max_artifact_bytes: default_max_artifact_bytes(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    60
}

fn default_max_artifact_bytes() -> u64 {
    DEFAULT_MAX_ARTIFACT_BYTES
}

/// Monitoring backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Backend base URL (default: https://app.aporia.com).
    #[serde(default = "default_monitoring_host")]
    pub host: String,
    /// Environment label (default: local-dev).
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Model identity registered with the backend.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_model_version")]
    pub model_version: String,
    /// Backend request timeout in seconds (default: 10).
    #[serde(default = "default_monitoring_timeout")]
    pub timeout_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            host: default_monitoring_host(),
            environment: default_environment(),
            model_id: default_model_id(),
            model_version: default_model_version(),
            timeout_secs: default_monitoring_timeout(),
        }
    }
}

fn default_monitoring_host() -> String {
    "https://app.aporia.com".to_string()
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_model_id() -> String {
    "bodywork-test-8wxi".to_string()
}

fn default_model_version() -> String {
    "v1".to_string()
}

fn default_monitoring_timeout() -> u64 {
    10
}

/// Secrets configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub monitoring: Option<TokenSecret>,
}

/// A single API token secret.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSecret {
    pub token: String,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided, must exist)
    /// 2. `~/.predictd/config.toml`
    /// 3. `/etc/predictd/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                info!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a specific config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PredictdError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            PredictdError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(PredictdError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".predictd").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/predictd/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// The configured model artifact location.
    pub fn model_source(&self) -> Result<ModelSource> {
        self.model
            .source
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(ModelSource::parse)
            .ok_or_else(|| {
                PredictdError::Configuration(
                    "model.source is not set; pass --model or set it in config.toml".to_string(),
                )
            })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.model.fetch_timeout_secs)
    }

    /// Combine config, secrets and environment into monitoring settings.
    ///
    /// `env` looks up environment variables; the daemon passes
    /// `|k| std::env::var(k).ok()`.
    pub fn monitoring_settings(
        &self,
        secrets: &Secrets,
        env: impl Fn(&str) -> Option<String>,
    ) -> MonitoringSettings {
        let monitoring = &self.monitoring;
        MonitoringSettings {
            token: secrets.monitoring_token(&env),
            host: env(HOST_ENV_VAR).unwrap_or_else(|| monitoring.host.clone()),
            environment: env(ENVIRONMENT_ENV_VAR).unwrap_or_else(|| monitoring.environment.clone()),
            model_id: monitoring.model_id.clone(),
            model_version: monitoring.model_version.clone(),
            timeout: Duration::from_secs(monitoring.timeout_secs),
        }
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.predictd/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/predictd/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (the token may come from the environment).
    pub fn load() -> Result<Self> {
        // Try user secrets first
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".predictd").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        // Try system secrets
        let system_secrets = PathBuf::from("/etc/predictd/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Parse a specific secrets file, enforcing permissions.
    pub fn load_checked(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        Self::load_from_file(path)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PredictdError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            PredictdError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            PredictdError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(PredictdError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Monitoring token from the secrets file, falling back to `APORIA_TOKEN`.
    pub fn monitoring_token(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.monitoring
            .as_ref()
            .map(|s| s.token.clone())
            .or_else(|| env(TOKEN_ENV_VAR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.address, "0.0.0.0:8000");
        assert_eq!(config.model.fetch_timeout_secs, 60);
        assert_eq!(config.model.max_artifact_bytes, 64 * 1024 * 1024);
        assert!(config.model.source.is_none());
        assert_eq!(config.monitoring.environment, "local-dev");
        assert_eq!(config.monitoring.model_version, "v1");
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            address = "127.0.0.1:9000"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "127.0.0.1:9000");
        // Defaults preserved
        assert_eq!(config.monitoring.timeout_secs, 10);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            address = "0.0.0.0:8080"

            [model]
            source = "https://models.example.com/model.json"
            fetch_timeout_secs = 5
            max_artifact_bytes = 1048576

            [monitoring]
            host = "https://monitoring.example.com"
            environment = "staging"
            model_id = "regressor"
            model_version = "v2"
            timeout_secs = 3
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "0.0.0.0:8080");
        assert_eq!(
            config.model_source().unwrap(),
            ModelSource::remote("https://models.example.com/model.json")
        );
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.model.max_artifact_bytes, 1_048_576);
        assert_eq!(config.monitoring.model_id, "regressor");
        assert_eq!(config.monitoring.model_version, "v2");
    }

    #[test]
    fn missing_model_source_is_an_error() {
        let err = Config::default().model_source().unwrap_err();
        assert!(err.to_string().contains("model.source"));
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [monitoring]
            token = "secret-token"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(
            secrets.monitoring_token(env_from(&[])),
            Some("secret-token".to_string())
        );
    }

    #[test]
    fn token_falls_back_to_env() {
        let secrets = Secrets::default();
        assert_eq!(secrets.monitoring_token(env_from(&[])), None);
        assert_eq!(
            secrets.monitoring_token(env_from(&[("APORIA_TOKEN", "from-env")])),
            Some("from-env".to_string())
        );
    }

    #[test]
    fn secrets_file_wins_over_env() {
        let secrets = Secrets {
            monitoring: Some(TokenSecret {
                token: "from-file".to_string(),
            }),
        };
        assert_eq!(
            secrets.monitoring_token(env_from(&[("APORIA_TOKEN", "from-env")])),
            Some("from-file".to_string())
        );
    }

    #[test]
    fn env_overrides_monitoring_host_and_environment() {
        let config = Config::default();
        let settings = config.monitoring_settings(
            &Secrets::default(),
            env_from(&[
                ("APORIA_TOKEN", "t"),
                ("APORIA_HOST", "http://localhost:1234"),
                ("APORIA_ENVIRONMENT", "prod"),
            ]),
        );
        assert_eq!(settings.token.as_deref(), Some("t"));
        assert_eq!(settings.host, "http://localhost:1234");
        assert_eq!(settings.environment, "prod");
        assert_eq!(settings.model_id, "bodywork-test-8wxi");
        assert_eq!(settings.timeout, Duration::from_secs(10));
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[cfg(unix)]
    #[test]
    fn insecure_secrets_file_is_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(&path, "[monitoring]\ntoken = \"t\"\n").unwrap();

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let err = Secrets::load_checked(&path).unwrap_err();
        assert!(err.to_string().contains("insecure permissions"));

        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        let secrets = Secrets::load_checked(&path).unwrap();
        assert_eq!(secrets.monitoring.unwrap().token, "t");
    }
}
