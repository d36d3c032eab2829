//! Transport trait for exchange requests.
//!
//! Provides a trait-based abstraction for sending prepared requests to the
//! exchange. This allows for:
//! - Dependency injection for testing
//! - Separation of signing from transport

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ExchangeError, ExchangeResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Header carrying the API key on authenticated requests.
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A fully prepared request: signing, if any, has already happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Endpoint path, e.g. `/api/v3/order`.
    pub path: &'static str,
    /// Encoded query string without the leading `?`.
    pub query: String,
    /// API key for the `X-MBX-APIKEY` header.
    pub api_key: Option<String>,
}

impl HttpRequest {
    /// Value of a query parameter, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then_some(value)
        })
    }
}

/// Trait for delivering requests to the exchange.
///
/// Resolves to the raw response body on success. Non-success responses are
/// turned into [`ExchangeError`] by the implementation.
pub trait ExchangeTransport: Send + Sync {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, ExchangeResult<String>>;
}

/// Arc wrapper for ExchangeTransport trait objects.
pub type DynTransport = Arc<dyn ExchangeTransport>;

type RouteKey = (HttpMethod, &'static str);

/// Scripted transport for tests.
///
/// Responses are queued per method and path. Once a queue is empty the
/// route's default response is used; routes with neither fail with a
/// transport error.
#[derive(Default)]
pub struct MockTransport {
    /// Recorded requests for verification.
    requests: Mutex<Vec<HttpRequest>>,
    queued: Mutex<HashMap<RouteKey, VecDeque<ExchangeResult<String>>>>,
    defaults: Mutex<HashMap<RouteKey, ExchangeResult<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot response.
    pub fn push_response(
        &self,
        method: HttpMethod,
        path: &'static str,
        response: ExchangeResult<String>,
    ) {
        self.queued
            .lock()
            .entry((method, path))
            .or_default()
            .push_back(response);
    }

    /// Queue a one-shot JSON body.
    pub fn push_json(&self, method: HttpMethod, path: &'static str, body: &str) {
        self.push_response(method, path, Ok(body.to_string()));
    }

    /// Queue a one-shot exchange error.
    pub fn push_api_error(&self, method: HttpMethod, path: &'static str, code: i64, message: &str) {
        self.push_response(
            method,
            path,
            Err(ExchangeError::Api {
                code,
                message: message.to_string(),
            }),
        );
    }

    /// Response used whenever the route's queue is empty.
    pub fn set_default(
        &self,
        method: HttpMethod,
        path: &'static str,
        response: ExchangeResult<String>,
    ) {
        self.defaults.lock().insert((method, path), response);
    }

    /// Get recorded requests.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Recorded requests for one route.
    pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    fn next_response(&self, key: RouteKey) -> ExchangeResult<String> {
        if let Some(response) = self.queued.lock().get_mut(&key).and_then(VecDeque::pop_front) {
            return response;
        }
        self.defaults.lock().get(&key).cloned().unwrap_or_else(|| {
            Err(ExchangeError::Transport(format!(
                "no mock response for {} {}",
                key.0, key.1
            )))
        })
    }
}

impl ExchangeTransport for MockTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, ExchangeResult<String>> {
        Box::pin(async move {
            let key = (request.method, request.path);
            self.requests.lock().push(request);
            self.next_response(key)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: HttpMethod, path: &'static str) -> HttpRequest {
        HttpRequest {
            method,
            path,
            query: "symbol=BTCUSDT&limit=5".to_string(),
            api_key: None,
        }
    }

    #[tokio::test]
    async fn test_mock_records_and_answers_in_order() {
        let mock = MockTransport::new();
        mock.push_json(HttpMethod::Get, "/api/v3/depth", "first");
        mock.set_default(HttpMethod::Get, "/api/v3/depth", Ok("fallback".to_string()));

        let first = mock.send(request(HttpMethod::Get, "/api/v3/depth")).await;
        let second = mock.send(request(HttpMethod::Get, "/api/v3/depth")).await;

        assert_eq!(first.unwrap(), "first");
        assert_eq!(second.unwrap(), "fallback");
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_routes_by_method() {
        let mock = MockTransport::new();
        mock.push_api_error(HttpMethod::Delete, "/api/v3/order", -2011, "Unknown order sent.");

        let post = mock.send(request(HttpMethod::Post, "/api/v3/order")).await;
        let delete = mock.send(request(HttpMethod::Delete, "/api/v3/order")).await;

        assert!(matches!(post, Err(ExchangeError::Transport(_))));
        assert!(matches!(delete, Err(ExchangeError::Api { code: -2011, .. })));
        assert_eq!(mock.requests_to(HttpMethod::Delete, "/api/v3/order").len(), 1);
    }

    #[test]
    fn test_request_param_lookup() {
        let req = request(HttpMethod::Get, "/api/v3/depth");
        assert_eq!(req.param("symbol"), Some("BTCUSDT"));
        assert_eq!(req.param("limit"), Some("5"));
        assert_eq!(req.param("missing"), None);
    }
}
