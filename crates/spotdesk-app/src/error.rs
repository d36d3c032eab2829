//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error: {0}")]
    Auth(#[from] spotdesk_exchange::AuthError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] spotdesk_exchange::ExchangeError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] spotdesk_telemetry::TelemetryError),

    #[error("Web server error: {0}")]
    Web(#[from] spotdesk_web::WebError),
}

pub type AppResult<T> = Result<T, AppError>;
