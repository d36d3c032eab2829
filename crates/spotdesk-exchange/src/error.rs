//! Exchange error types.

use thiserror::Error;

/// Binance error code for a timestamp outside the receive window.
pub const TIMESTAMP_OUTSIDE_RECV_WINDOW: i64 = -1021;
/// Binance error code for an unknown symbol.
pub const INVALID_SYMBOL: i64 = -1121;

#[derive(Debug, Clone, Error)]
pub enum ExchangeError {
    /// Error returned by the exchange as `{"code": ..., "msg": ...}`.
    #[error("Binance API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Non-success HTTP status without a recognizable error body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Symbol {0} not found")]
    SymbolNotFound(String),

    /// A pass-through query failure with the operation that failed.
    #[error("{operation}: {source}")]
    Query {
        operation: &'static str,
        source: Box<ExchangeError>,
    },
}

impl ExchangeError {
    /// Parse a non-success response body.
    ///
    /// Binance returns errors in the format: `{"code": -1000, "msg": "..."}`
    pub fn from_api_response(status: u16, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ApiError {
            code: i64,
            msg: String,
        }

        match serde_json::from_str::<ApiError>(body) {
            Ok(err) => Self::Api {
                code: err.code,
                message: err.msg,
            },
            Err(_) => Self::Http {
                status,
                body: body.to_string(),
            },
        }
    }

    /// Wrap with the name of the query that failed.
    pub fn context(self, operation: &'static str) -> Self {
        Self::Query {
            operation,
            source: Box::new(self),
        }
    }

    /// Exchange error code, if the exchange produced one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            Self::Query { source, .. } => source.code(),
            _ => None,
        }
    }

    /// The request timestamp fell outside the exchange's receive window.
    pub fn is_clock_skew(&self) -> bool {
        matches!(
            self,
            Self::Api {
                code: TIMESTAMP_OUTSIDE_RECV_WINDOW,
                ..
            }
        )
    }

    /// The exchange could not be reached at all.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Query { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// Message suitable for showing to the person who submitted the order.
    pub fn user_message(&self) -> String {
        if self.is_transport() {
            return "Could not reach the exchange. Please try again.".to_string();
        }

        let text = self.to_string();
        if self.code() == Some(INVALID_SYMBOL) || text.contains("Invalid symbol") {
            "Invalid trading symbol. Please check the symbol name.".to_string()
        } else if text.to_ascii_lowercase().contains("insufficient balance") {
            "Insufficient balance for this order.".to_string()
        } else if text.contains("NOTIONAL") {
            "Order value is too small. Please increase quantity or price.".to_string()
        } else if text.contains("PRICE_FILTER") {
            "Price is outside allowed range for this symbol.".to_string()
        } else {
            text
        }
    }
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Errors that can occur while loading credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required environment variable is missing or empty.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_response_parses_code() {
        let err = ExchangeError::from_api_response(
            400,
            r#"{"code":-1021,"msg":"Timestamp for this request is outside of the recvWindow."}"#,
        );
        assert!(err.is_clock_skew());
        assert_eq!(err.code(), Some(-1021));
    }

    #[test]
    fn test_from_api_response_falls_back_to_http() {
        let err = ExchangeError::from_api_response(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, ExchangeError::Http { status: 502, .. }));
        assert!(!err.is_clock_skew());
    }

    #[test]
    fn test_query_context_display() {
        let err = ExchangeError::Transport("connection refused".to_string())
            .context("Failed to get account info");
        assert_eq!(
            err.to_string(),
            "Failed to get account info: Transport error: connection refused"
        );
        assert!(err.is_transport());
    }

    #[test]
    fn test_wrapped_skew_is_not_retryable_skew() {
        let err = ExchangeError::Api {
            code: TIMESTAMP_OUTSIDE_RECV_WINDOW,
            message: "late".to_string(),
        }
        .context("Failed to cancel order");
        assert!(!err.is_clock_skew());
        assert_eq!(err.code(), Some(TIMESTAMP_OUTSIDE_RECV_WINDOW));
    }

    #[test]
    fn test_user_message_mapping() {
        let api = |code: i64, msg: &str| ExchangeError::Api {
            code,
            message: msg.to_string(),
        };

        assert_eq!(
            api(-1121, "Invalid symbol.").user_message(),
            "Invalid trading symbol. Please check the symbol name."
        );
        assert_eq!(
            api(-2010, "Account has insufficient balance for requested action.").user_message(),
            "Insufficient balance for this order."
        );
        assert_eq!(
            api(-2010, "Duplicate order sent.").user_message(),
            "Binance API error -2010: Duplicate order sent."
        );
        assert_eq!(
            api(-1013, "Filter failure: MIN_NOTIONAL").user_message(),
            "Order value is too small. Please increase quantity or price."
        );
        assert_eq!(
            api(-1013, "Filter failure: NOTIONAL").user_message(),
            "Order value is too small. Please increase quantity or price."
        );
        assert_eq!(
            api(-1013, "Filter failure: PRICE_FILTER").user_message(),
            "Price is outside allowed range for this symbol."
        );
        assert_eq!(
            ExchangeError::Transport("timed out".to_string()).user_message(),
            "Could not reach the exchange. Please try again."
        );
        assert_eq!(
            api(-1100, "Illegal characters found in parameter 'price'").user_message(),
            "Binance API error -1100: Illegal characters found in parameter 'price'"
        );
    }
}
