//! Structured logging initialization.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{TelemetryError, TelemetryResult};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,spotdesk=debug";

/// `[logging]` section of the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Directory for the trade log; created on startup.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_file_name() -> String {
    "trade_logs.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_name: default_log_file_name(),
        }
    }
}

impl LoggingConfig {
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Create the log directory and open the log file for appending.
pub fn open_log_file(config: &LoggingConfig) -> TelemetryResult<File> {
    let path = config.log_path();
    let open = |path: &Path| -> std::io::Result<File> {
        fs::create_dir_all(&config.dir)?;
        OpenOptions::new().create(true).append(true).open(path)
    };

    open(&path).map_err(|source| TelemetryError::LogFile { path, source })
}

/// Plain-text layer for the trade log file.
fn file_layer<S>(file: Arc<File>) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer().with_writer(file).with_ansi(false).with_target(true)
}

/// Initialize logging to stdout and the trade log file.
///
/// Stdout gets JSON output when `RUST_ENV=production` and pretty output
/// otherwise. The file always gets plain text.
pub fn init_logging(config: &LoggingConfig) -> TelemetryResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file = Arc::new(open_log_file(config)?);

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    let result = if is_production {
        // JSON format for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer(file))
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        // Pretty format for development
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer(file))
            .with(fmt::layer().pretty().with_target(true))
            .try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(log_file = %config.log_path().display(), "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_log_path() {
        let config = LoggingConfig::default();
        assert_eq!(config.log_path(), PathBuf::from("logs/trade_logs.log"));
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: LoggingConfig = toml::from_str(r#"dir = "/var/log/spotdesk""#).unwrap();
        assert_eq!(config.dir, PathBuf::from("/var/log/spotdesk"));
        assert_eq!(config.file_name, "trade_logs.log");
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = TempDir::new().unwrap();
        let config = LoggingConfig {
            dir: dir.path().join("nested"),
            file_name: "trades.log".to_string(),
        };

        open_log_file(&config).unwrap();
        assert!(config.log_path().exists());
    }

    #[test]
    fn test_open_log_file_error_names_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let config = LoggingConfig {
            dir: blocker.clone(),
            file_name: "trades.log".to_string(),
        };
        let err = open_log_file(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::LogFile { .. }));
        assert!(err.to_string().contains("trades.log"));
    }
}
