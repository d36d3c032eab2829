//! Prometheus metrics and structured logging for spotdesk.
//!
//! - Prometheus metrics for order attempts, outcomes and clock sync
//! - Structured logging to stdout and a trade log file
//! - Trade event helpers shared by the web server and the CLI

pub mod error;
pub mod logging;
pub mod metrics;
pub mod trade_log;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LoggingConfig};
pub use metrics::{encode_metrics, metrics_content_type, Metrics, OUTCOME_FAILURE, OUTCOME_SUCCESS};
pub use trade_log::{
    log_error, log_trade_attempt, log_trade_failure, log_trade_result, log_validation_rejected,
};
