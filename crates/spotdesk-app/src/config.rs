//! Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use spotdesk_exchange::{ExchangeSettings, DEFAULT_TIMEOUT, TESTNET_BASE_URL};
use spotdesk_telemetry::LoggingConfig;
use spotdesk_web::ServerConfig;

use crate::error::{AppError, AppResult};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "SPOTDESK_CONFIG";

/// Config file used when neither the flag nor the env var is set.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Load a `.env` file into the process environment.
///
/// `None` searches the working directory and its parents. Variables already
/// set are not overridden. Returns the file that was loaded, if any.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|()| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

/// `[exchange]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// REST root. Defaults to the spot testnet.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `recvWindow` for signed requests; exchange default when unset.
    #[serde(default)]
    pub recv_window_ms: Option<u64>,
}

fn default_base_url() -> String {
    TESTNET_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            recv_window_ms: None,
        }
    }
}

impl ExchangeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settings(&self) -> ExchangeSettings {
        ExchangeSettings {
            recv_window_ms: self.recv_window_ms,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Config path: CLI flag > `SPOTDESK_CONFIG` > default.
    pub fn resolve_path(cli: Option<String>) -> PathBuf {
        cli.or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
            .into()
    }

    /// Load from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> AppResult<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.exchange.timeout_secs == 0 {
            return Err(AppError::Config(
                "exchange.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !self.exchange.base_url.starts_with("http://")
            && !self.exchange.base_url.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "exchange.base_url must be an http(s) URL: {}",
                self.exchange.base_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.exchange.base_url, "https://testnet.binance.vision");
        assert_eq!(config.exchange.timeout(), Duration::from_secs(10));
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.file_name, "trade_logs.log");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 9100

            [exchange]
            recv_window_ms = 5000

            [logging]
            dir = "/tmp/spotdesk-logs"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.exchange.settings().recv_window_ms, Some(5000));
        assert_eq!(config.exchange.timeout_secs, 10);
        assert_eq!(config.logging.log_path(), PathBuf::from("/tmp/spotdesk-logs/trade_logs.log"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = AppConfig::from_toml_str("[exchange]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = AppConfig::from_toml_str("[exchange]\nbase_url = \"testnet.binance.vision\"\n")
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/spotdesk.toml")).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_env_file_supplies_config_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let env_path = dir.path().join(".env");
        std::fs::write(&env_path, "SPOTDESK_CONFIG=config/from-dotenv.toml\n").unwrap();

        assert_eq!(load_env_file(Some(&env_path)), Some(env_path.clone()));
        assert_eq!(AppConfig::resolve_path(None), PathBuf::from("config/from-dotenv.toml"));
        assert_eq!(AppConfig::resolve_path(Some("cli.toml".to_string())), PathBuf::from("cli.toml"));
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(load_env_file(Some(&dir.path().join(".env"))), None);
    }

    #[test]
    fn test_cli_flag_wins() {
        let path = AppConfig::resolve_path(Some("custom.toml".to_string()));
        assert_eq!(path, PathBuf::from("custom.toml"));
    }
}
