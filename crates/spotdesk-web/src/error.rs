//! Web layer error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use spotdesk_exchange::ExchangeError;
use thiserror::Error;
use tracing::warn;

/// Server startup failures.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub type WebResult<T> = Result<T, WebError>;

/// Failed pass-through query, rendered as 502 with `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError(pub ExchangeError);

impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "Exchange query failed");
        (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}
