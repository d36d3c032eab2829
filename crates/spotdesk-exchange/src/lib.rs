//! Spot exchange access for spotdesk.
//!
//! Wraps the spot REST API: signed order placement, account and market
//! queries, and server time synchronization.
//!
//! # Key Components
//!
//! - [`ExchangeClient`]: Order placement with a single clock-skew retry, plus pass-through queries
//! - [`TimeOffset`]: Server minus local clock offset applied to signed timestamps
//! - [`RequestSigner`]: HMAC-SHA256 query signing
//! - [`ExchangeTransport`]: Request delivery seam ([`HttpTransport`] in production, [`MockTransport`] in tests)
//! - [`ApiCredentials`]: API key and secret loaded from the environment
//!
//! # Order Placement Flow
//!
//! 1. Build parameters for the order kind (MARKET / LIMIT / STOP_LOSS_LIMIT)
//! 2. Append `timestamp` (local time + offset) and sign
//! 3. On error -1021: resync time once, rebuild with a fresh timestamp, resubmit once
//! 4. Any other outcome is returned unchanged

pub mod client;
pub mod clock;
pub mod credentials;
pub mod error;
pub mod http;
pub mod responses;
pub mod signer;
pub mod transport;

// Client
pub use client::{
    order_params, paths, ExchangeClient, ExchangeSettings, DEFAULT_ORDER_BOOK_LIMIT,
    ORDER_RESPONSE_TYPE,
};

// Time
pub use clock::{Clock, ManualClock, SystemClock, TimeOffset};

// Credentials and signing
pub use credentials::ApiCredentials;
pub use signer::RequestSigner;

// Error types
pub use error::{AuthError, ExchangeError, ExchangeResult};

// Transport
pub use http::{HttpTransport, DEFAULT_TIMEOUT, TESTNET_BASE_URL};
pub use transport::{DynTransport, ExchangeTransport, HttpMethod, HttpRequest, MockTransport};

// Responses
pub use responses::{
    AccountInfo, Balance, ExchangeInfo, NewOrderResponse, OrderBook, OrderFill, OrderSnapshot,
    SymbolInfo, TickerPrice,
};
