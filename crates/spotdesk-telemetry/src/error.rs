//! Telemetry error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),

    #[error("Failed to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Metrics encoding failed: {0}")]
    MetricsEncode(String),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
