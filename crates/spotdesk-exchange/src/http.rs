//! HTTPS transport to the exchange REST API.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::{ExchangeError, ExchangeResult};
use crate::transport::{BoxFuture, ExchangeTransport, HttpMethod, HttpRequest, API_KEY_HEADER};

/// Spot testnet REST endpoint.
pub const TESTNET_BASE_URL: &str = "https://testnet.binance.vision";

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest-backed transport.
pub struct HttpTransport {
    /// HTTP client.
    client: Client,
    /// Base URL without trailing slash.
    base_url: String,
}

impl HttpTransport {
    /// Create a new transport.
    ///
    /// # Arguments
    /// * `base_url` - REST root (e.g., "https://testnet.binance.vision")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExchangeError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        }
    }

    async fn execute(&self, request: HttpRequest) -> ExchangeResult<String> {
        let url = self.build_url(request.path, &request.query);
        debug!(method = %request.method, path = request.path, "Exchange request");

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        if let Some(api_key) = &request.api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Transport(format!("Failed to read response: {e}")))?;

        if status.is_success() {
            Ok(body)
        } else {
            debug!(status = status.as_u16(), body = %body, "Exchange returned error status");
            Err(ExchangeError::from_api_response(status.as_u16(), &body))
        }
    }
}

impl ExchangeTransport for HttpTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, ExchangeResult<String>> {
        Box::pin(self.execute(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_no_query() {
        let transport = HttpTransport::new("https://api.example.com", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            transport.build_url("/api/v3/time", ""),
            "https://api.example.com/api/v3/time"
        );
    }

    #[test]
    fn test_build_url_with_query() {
        let transport = HttpTransport::new("https://api.example.com", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            transport.build_url("/api/v3/order", "symbol=BTCUSDT&side=BUY"),
            "https://api.example.com/api/v3/order?symbol=BTCUSDT&side=BUY"
        );
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let transport = HttpTransport::new("https://testnet.binance.vision/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(transport.base_url(), TESTNET_BASE_URL);
    }
}
