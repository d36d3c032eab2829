//! Order-related types and identifiers.
//!
//! Provides order side, type, time-in-force, client order ID, the validated
//! order request and the exchange-agnostic order result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Wire representation used by the exchange.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            other => Err(CoreError::InvalidSide(other.to_string())),
        }
    }
}

/// Order type as submitted by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
    /// Stop-limit order. Sent to the exchange as `STOP_LOSS_LIMIT`.
    StopLimit,
}

impl OrderType {
    /// Name used in the order form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
            Self::StopLimit => "STOP_LIMIT",
        }
    }

    /// `type` parameter expected by the exchange order endpoint.
    pub fn exchange_type(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
            Self::StopLimit => "STOP_LOSS_LIMIT",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MARKET" => Ok(Self::Market),
            "LIMIT" => Ok(Self::Limit),
            "STOP_LIMIT" => Ok(Self::StopLimit),
            other => Err(CoreError::InvalidOrderType(other.to_string())),
        }
    }
}

/// Time-in-force for resting orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled.
    #[default]
    #[serde(rename = "GTC")]
    GoodTilCancelled,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoodTilCancelled => "GTC",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client order ID sent as `newClientOrderId`.
///
/// Generated once per validated request; a resubmission reuses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a new unique client order ID.
    ///
    /// Format: `spotdesk_{timestamp_ms}_{uuid_short}`
    pub fn new() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().simple().to_string()[..8];
        Self(format!("spotdesk_{ts}_{uuid_short}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-specific order parameters.
///
/// Price and stop price only exist on the variants that need them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "order_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Market,
    Limit { price: Decimal },
    StopLimit { price: Decimal, stop_price: Decimal },
}

/// A validated order ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Upper-cased trading pair, e.g. `BTCUSDT`.
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    #[serde(flatten)]
    pub kind: OrderKind,
    pub client_order_id: ClientOrderId,
}

impl OrderRequest {
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self::new(symbol, side, quantity, OrderKind::Market)
    }

    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self::new(symbol, side, quantity, OrderKind::Limit { price })
    }

    pub fn stop_limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self::new(
            symbol,
            side,
            quantity,
            OrderKind::StopLimit { price, stop_price },
        )
    }

    pub fn new(symbol: impl Into<String>, side: OrderSide, quantity: Decimal, kind: OrderKind) -> Self {
        Self {
            symbol: symbol.into().to_ascii_uppercase(),
            side,
            quantity,
            kind,
            client_order_id: ClientOrderId::new(),
        }
    }

    pub fn order_type(&self) -> OrderType {
        match self.kind {
            OrderKind::Market => OrderType::Market,
            OrderKind::Limit { .. } => OrderType::Limit,
            OrderKind::StopLimit { .. } => OrderType::StopLimit,
        }
    }

    pub fn price(&self) -> Option<Decimal> {
        match self.kind {
            OrderKind::Market => None,
            OrderKind::Limit { price } | OrderKind::StopLimit { price, .. } => Some(price),
        }
    }

    pub fn stop_price(&self) -> Option<Decimal> {
        match self.kind {
            OrderKind::StopLimit { stop_price, .. } => Some(stop_price),
            _ => None,
        }
    }
}

/// Outcome of a successful order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderResult {
    pub order_id: u64,
    pub client_order_id: Option<String>,
    pub symbol: Option<String>,
    pub side: Option<String>,
    pub order_type: Option<String>,
    /// Execution status reported by the exchange (e.g. `FILLED`, `NEW`).
    pub status: String,
    pub orig_qty: Option<Decimal>,
    pub executed_qty: Decimal,
    pub avg_price: Option<Decimal>,
    pub transact_time: Option<i64>,
}
