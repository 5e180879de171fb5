//! Configuration management for Dermascan
//!
//! Configuration is layered: YAML file, then `DERMASCAN_*` environment
//! variables, then command-line overrides. [`Config::validate`] runs last.

use crate::error::{DermascanError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Dermascan
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote backend settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Local store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend; every API path is relative to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://backendscan-production.up.railway.app".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Local store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Directory of the sled database; the platform data directory is used
    /// when unset
    #[serde(default)]
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from file, environment, and CLI
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns `DermascanError::Config` if the file exists but cannot be
    /// read or parsed.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DermascanError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| DermascanError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("DERMASCAN_API_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("DERMASCAN_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid DERMASCAN_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(path) = std::env::var("DERMASCAN_STORE_PATH") {
            self.storage.path = Some(path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            self.api.base_url = api_url.clone();
        }
        if let Some(store) = &cli.store {
            self.storage.path = Some(store.clone());
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `DermascanError::Config` when the base URL is not an
    /// http(s) URL or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            DermascanError::Config(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(DermascanError::Config(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(DermascanError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if matches!(&self.storage.path, Some(p) if p.trim().is_empty()) {
            return Err(
                DermascanError::Config("storage.path cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        std::env::remove_var("DERMASCAN_API_URL");
        std::env::remove_var("DERMASCAN_TIMEOUT_SECONDS");
        std::env::remove_var("DERMASCAN_STORE_PATH");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(
            config.api.base_url,
            "https://backendscan-production.up.railway.app"
        );
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(config.storage.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml_uses_defaults() {
        let yaml = "api:\n  timeout_seconds: 10\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.api.base_url, default_base_url());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_garbage_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_load_missing_file_falls_back_to_defaults() {
        clear_env();
        let config = Config::load("/nonexistent/dermascan.yaml", &Cli::default()).unwrap();
        assert_eq!(config.api.base_url, default_base_url());
    }

    #[test]
    #[serial]
    fn test_load_reads_file_and_env_overrides() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "api:\n  base_url: http://localhost:9000\n  timeout_seconds: 5\n",
        )
        .unwrap();

        std::env::set_var("DERMASCAN_TIMEOUT_SECONDS", "12");
        std::env::set_var("DERMASCAN_STORE_PATH", "/tmp/dermascan-test-store");
        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        clear_env();

        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.api.timeout_seconds, 12);
        assert_eq!(
            config.storage.path.as_deref(),
            Some("/tmp/dermascan-test-store")
        );
    }

    #[test]
    #[serial]
    fn test_invalid_env_timeout_is_ignored() {
        clear_env();
        std::env::set_var("DERMASCAN_TIMEOUT_SECONDS", "soon");
        let config = Config::load("/nonexistent/dermascan.yaml", &Cli::default()).unwrap();
        clear_env();
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_win_over_env() {
        clear_env();
        std::env::set_var("DERMASCAN_API_URL", "http://env.example");
        let cli = Cli {
            api_url: Some("http://cli.example".to_string()),
            store: Some("/tmp/cli-store".to_string()),
            ..Cli::default()
        };
        let config = Config::load("/nonexistent/dermascan.yaml", &cli).unwrap();
        clear_env();
        assert_eq!(config.api.base_url, "http://cli.example");
        assert_eq!(config.storage.path.as_deref(), Some("/tmp/cli-store"));
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api: [unclosed").unwrap();
        let err = Config::from_file(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
