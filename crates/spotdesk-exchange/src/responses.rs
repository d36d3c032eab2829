//! Exchange API response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spotdesk_core::OrderResult;

/// Response from GET /api/v3/time.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerTimeResponse {
    #[serde(rename = "serverTime")]
    pub server_time: i64,
}

/// Response from POST /api/v3/order.
///
/// Only `orderId` and `status` are guaranteed; everything else depends on
/// the response type the exchange chose.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderResponse {
    pub symbol: Option<String>,
    pub order_id: u64,
    pub client_order_id: Option<String>,
    pub transact_time: Option<i64>,
    pub price: Option<Decimal>,
    pub orig_qty: Option<Decimal>,
    #[serde(default)]
    pub executed_qty: Decimal,
    pub cummulative_quote_qty: Option<Decimal>,
    pub status: String,
    pub time_in_force: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub side: Option<String>,
    /// Fills, included when the response type is FULL.
    #[serde(default)]
    pub fills: Vec<OrderFill>,
}

/// A fill from an order response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFill {
    pub price: Decimal,
    pub qty: Decimal,
    #[serde(default)]
    pub commission: Decimal,
    #[serde(default)]
    pub commission_asset: String,
}

impl NewOrderResponse {
    /// Average execution price.
    ///
    /// Spot responses carry no average price, so it is derived from the
    /// quote quantity, falling back to the fills.
    pub fn average_price(&self) -> Option<Decimal> {
        if self.executed_qty > Decimal::ZERO {
            if let Some(quote) = self.cummulative_quote_qty.filter(|q| *q > Decimal::ZERO) {
                return quote
                    .checked_div(self.executed_qty)
                    .map(|p| p.round_dp(8).normalize());
            }
        }

        let filled: Decimal = self.fills.iter().map(|f| f.qty).sum();
        if filled <= Decimal::ZERO {
            return None;
        }
        let notional: Decimal = self.fills.iter().map(|f| f.price * f.qty).sum();
        notional
            .checked_div(filled)
            .map(|p| p.round_dp(8).normalize())
    }
}

impl From<NewOrderResponse> for OrderResult {
    fn from(response: NewOrderResponse) -> Self {
        let avg_price = response.average_price();
        OrderResult {
            order_id: response.order_id,
            client_order_id: response.client_order_id,
            symbol: response.symbol,
            side: response.side,
            order_type: response.order_type,
            status: response.status,
            orig_qty: response.orig_qty,
            executed_qty: response.executed_qty,
            avg_price,
            transact_time: response.transact_time,
        }
    }
}

/// Response from GET /api/v3/account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub can_trade: bool,
    #[serde(default)]
    pub can_withdraw: bool,
    #[serde(default)]
    pub can_deposit: bool,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub balances: Vec<Balance>,
}

/// Balance of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

impl Balance {
    /// Zero balance for an asset the account does not hold.
    pub fn empty(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            free: Decimal::ZERO,
            locked: Decimal::ZERO,
        }
    }

    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

/// Response from GET /api/v3/ticker/price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// Response from GET /api/v3/depth.
///
/// Levels are `(price, quantity)` pairs, best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    pub last_update_id: u64,
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<(Decimal, Decimal)> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<(Decimal, Decimal)> {
        self.asks.first().copied()
    }
}

/// Order as reported by GET /api/v3/openOrders and DELETE /api/v3/order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub symbol: String,
    pub order_id: u64,
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub orig_qty: Decimal,
    #[serde(default)]
    pub executed_qty: Decimal,
    pub status: String,
    pub time_in_force: Option<String>,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    pub stop_price: Option<Decimal>,
    /// Creation time (ms). Not present on cancel responses.
    pub time: Option<i64>,
}

/// Response from GET /api/v3/exchangeInfo.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
}

/// Trading rules summary for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default)]
    pub order_types: Vec<String>,
}
