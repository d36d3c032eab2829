//! Spot exchange client.
//!
//! Builds and signs requests for the spot REST API, owns the server time
//! offset, and resubmits an order once when the exchange rejects its
//! timestamp.

use serde::de::DeserializeOwned;
use spotdesk_core::{OrderKind, OrderRequest, OrderResult, TimeInForce};
use spotdesk_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock, TimeOffset};
use crate::credentials::ApiCredentials;
use crate::error::{ExchangeError, ExchangeResult};
use crate::responses::{
    AccountInfo, Balance, ExchangeInfo, NewOrderResponse, OrderBook, OrderSnapshot,
    ServerTimeResponse, SymbolInfo, TickerPrice,
};
use crate::signer::{encode_query, RequestSigner};
use crate::transport::{DynTransport, HttpMethod, HttpRequest};

/// REST endpoint paths.
pub mod paths {
    pub const PING: &str = "/api/v3/ping";
    pub const TIME: &str = "/api/v3/time";
    pub const EXCHANGE_INFO: &str = "/api/v3/exchangeInfo";
    pub const ACCOUNT: &str = "/api/v3/account";
    pub const ORDER: &str = "/api/v3/order";
    pub const OPEN_ORDERS: &str = "/api/v3/openOrders";
    pub const TICKER_PRICE: &str = "/api/v3/ticker/price";
    pub const DEPTH: &str = "/api/v3/depth";
}

/// Default depth for order book queries.
pub const DEFAULT_ORDER_BOOK_LIMIT: u32 = 100;

/// `newOrderRespType` for every order: status, executed and quote quantities plus fills.
pub const ORDER_RESPONSE_TYPE: &str = "FULL";

/// Tunables for signed requests.
#[derive(Debug, Clone, Default)]
pub struct ExchangeSettings {
    /// `recvWindow` sent with signed requests; exchange default when `None`.
    pub recv_window_ms: Option<u64>,
}

/// Order placement and account queries against the spot REST API.
pub struct ExchangeClient<C: Clock = SystemClock> {
    transport: DynTransport,
    credentials: ApiCredentials,
    time: TimeOffset<C>,
    settings: ExchangeSettings,
}

impl ExchangeClient<SystemClock> {
    /// Client over the system clock with default settings.
    pub fn with_system_clock(transport: DynTransport, credentials: ApiCredentials) -> Self {
        Self::new(transport, credentials, SystemClock, ExchangeSettings::default())
    }
}

impl<C: Clock> ExchangeClient<C> {
    pub fn new(
        transport: DynTransport,
        credentials: ApiCredentials,
        clock: C,
        settings: ExchangeSettings,
    ) -> Self {
        Self {
            transport,
            credentials,
            time: TimeOffset::new(clock),
            settings,
        }
    }

    /// Get the API key (for logging/debugging).
    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Current server offset (server - local) in milliseconds.
    pub fn time_offset_ms(&self) -> i64 {
        self.time.offset_ms()
    }

    /// Local time of the last successful sync.
    pub fn last_sync_ms(&self) -> Option<i64> {
        self.time.last_sync_ms()
    }

    // ========================================================================
    // Time Synchronization
    // ========================================================================

    /// Synchronize with exchange server time.
    ///
    /// Returns the new offset, or `None` when the server could not be asked;
    /// the previous offset stays in effect in that case.
    pub async fn sync_time(&self) -> Option<i64> {
        match self.public::<ServerTimeResponse>(paths::TIME, &[]).await {
            Ok(response) => {
                let local_time = self.time.local_ms();
                let offset = self.time.record_server_time(response.server_time);
                Metrics::time_offset(offset);
                info!(
                    server_time = response.server_time,
                    local_time,
                    offset_ms = offset,
                    "Time synchronized with exchange server"
                );
                Some(offset)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    offset_ms = self.time.offset_ms(),
                    "Could not sync time with exchange server, keeping previous offset"
                );
                None
            }
        }
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Place an order.
    ///
    /// POST /api/v3/order
    ///
    /// A timestamp rejection triggers one resync and one resubmission of the
    /// same order. Whatever the resubmission returns is final. Every other
    /// failure is returned as-is.
    pub async fn place_order(&self, order: &OrderRequest) -> ExchangeResult<OrderResult> {
        info!(
            symbol = %order.symbol,
            side = %order.side,
            order_type = %order.order_type(),
            quantity = %order.quantity,
            price = ?order.price(),
            stop_price = ?order.stop_price(),
            client_order_id = %order.client_order_id,
            "Placing order"
        );

        let result = match self.submit_order(order).await {
            Err(e) if e.is_clock_skew() => {
                warn!(
                    error = %e,
                    offset_ms = self.time.offset_ms(),
                    "Order timestamp rejected, resyncing clock and retrying once"
                );
                Metrics::clock_skew_retry();
                self.sync_time().await;
                self.submit_order(order).await
            }
            other => other,
        };

        match &result {
            Ok(placed) => info!(
                order_id = placed.order_id,
                status = %placed.status,
                executed_qty = %placed.executed_qty,
                "Order placed"
            ),
            Err(e) => warn!(error = %e, code = ?e.code(), "Order rejected"),
        }

        result
    }

    async fn submit_order(&self, order: &OrderRequest) -> ExchangeResult<OrderResult> {
        let response: NewOrderResponse = self
            .signed(HttpMethod::Post, paths::ORDER, &order_params(order))
            .await?;
        Ok(response.into())
    }

    /// Cancel an order by exchange order ID.
    ///
    /// DELETE /api/v3/order
    pub async fn cancel_order(&self, symbol: &str, order_id: u64) -> ExchangeResult<OrderSnapshot> {
        let params = [("symbol", symbol.to_string()), ("orderId", order_id.to_string())];

        info!(symbol = %symbol, order_id, "Canceling order");
        self.signed(HttpMethod::Delete, paths::ORDER, &params)
            .await
            .map_err(|e| e.context("Failed to cancel order"))
    }

    /// Open orders, for one symbol or all of them.
    ///
    /// GET /api/v3/openOrders
    pub async fn get_open_orders(&self, symbol: Option<&str>) -> ExchangeResult<Vec<OrderSnapshot>> {
        let params: Vec<(&str, String)> = symbol
            .map(|s| vec![("symbol", s.to_string())])
            .unwrap_or_default();

        self.signed(HttpMethod::Get, paths::OPEN_ORDERS, &params)
            .await
            .map_err(|e| e.context("Failed to get open orders"))
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// GET /api/v3/account
    pub async fn get_account_info(&self) -> ExchangeResult<AccountInfo> {
        self.signed(HttpMethod::Get, paths::ACCOUNT, &[])
            .await
            .map_err(|e| e.context("Failed to get account info"))
    }

    /// Balances of every asset, or exactly one entry for `asset`.
    ///
    /// An asset the account does not hold is reported with zero balances.
    pub async fn get_balance(&self, asset: Option<&str>) -> ExchangeResult<Vec<Balance>> {
        let account: AccountInfo = self
            .signed(HttpMethod::Get, paths::ACCOUNT, &[])
            .await
            .map_err(|e| e.context("Failed to get balance"))?;

        Ok(match asset {
            Some(asset) => {
                let wanted = asset.trim().to_ascii_uppercase();
                let balance = account
                    .balances
                    .into_iter()
                    .find(|b| b.asset == wanted)
                    .unwrap_or_else(|| Balance::empty(wanted));
                vec![balance]
            }
            None => account.balances,
        })
    }

    // ========================================================================
    // Market Data
    // ========================================================================

    /// Latest price for one symbol, or for every symbol.
    ///
    /// GET /api/v3/ticker/price
    pub async fn get_ticker_price(&self, symbol: Option<&str>) -> ExchangeResult<Vec<TickerPrice>> {
        let result = match symbol {
            Some(symbol) => self
                .public::<TickerPrice>(paths::TICKER_PRICE, &[("symbol", symbol.to_string())])
                .await
                .map(|ticker| vec![ticker]),
            None => self.public::<Vec<TickerPrice>>(paths::TICKER_PRICE, &[]).await,
        };

        result.map_err(|e| e.context("Failed to get ticker price"))
    }

    /// Order book depth snapshot.
    ///
    /// GET /api/v3/depth
    pub async fn get_order_book(&self, symbol: &str, limit: u32) -> ExchangeResult<OrderBook> {
        let params = [("symbol", symbol.to_string()), ("limit", limit.to_string())];

        self.public(paths::DEPTH, &params)
            .await
            .map_err(|e| e.context("Failed to get order book"))
    }

    /// Trading rules for one symbol.
    ///
    /// GET /api/v3/exchangeInfo
    pub async fn get_symbol_info(&self, symbol: &str) -> ExchangeResult<SymbolInfo> {
        let info: ExchangeInfo = self
            .public(paths::EXCHANGE_INFO, &[("symbol", symbol.to_string())])
            .await
            .map_err(|e| e.context("Failed to get symbol info"))?;

        info.symbols
            .into_iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| {
                ExchangeError::SymbolNotFound(symbol.to_string()).context("Failed to get symbol info")
            })
    }

    /// Whether the exchange answers a ping.
    ///
    /// GET /api/v3/ping
    pub async fn test_connectivity(&self) -> bool {
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: paths::PING,
            query: String::new(),
            api_key: None,
        };
        match self.transport.send(request).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Connectivity check failed");
                false
            }
        }
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    fn public_request(
        &self,
        path: &'static str,
        params: &[(&str, String)],
    ) -> ExchangeResult<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path,
            query: encode_query(params)?,
            api_key: None,
        })
    }

    /// Signs with the offset-adjusted timestamp current at call time.
    fn signed_request(
        &self,
        method: HttpMethod,
        path: &'static str,
        params: &[(&str, String)],
    ) -> ExchangeResult<HttpRequest> {
        let mut params = params.to_vec();
        if let Some(recv_window) = self.settings.recv_window_ms {
            params.push(("recvWindow", recv_window.to_string()));
        }

        let query =
            RequestSigner::new(&self.credentials).sign_params(&params, self.time.timestamp_ms())?;

        Ok(HttpRequest {
            method,
            path,
            query,
            api_key: Some(self.credentials.api_key().to_string()),
        })
    }

    async fn signed<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &'static str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let request = self.signed_request(method, path, params)?;
        self.execute(request).await
    }

    async fn public<T: DeserializeOwned>(
        &self,
        path: &'static str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let request = self.public_request(path, params)?;
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: HttpRequest) -> ExchangeResult<T> {
        let path = request.path;
        let body = self.transport.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(path, error = %e, "Failed to parse exchange response");
            ExchangeError::Parse(format!("{path}: {e}"))
        })
    }
}

/// Order endpoint parameters for a request, in submission order.
pub fn order_params(order: &OrderRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("symbol", order.symbol.clone()),
        ("side", order.side.as_str().to_string()),
        ("type", order.order_type().exchange_type().to_string()),
    ];

    let quantity = order.quantity.normalize().to_string();
    match order.kind {
        OrderKind::Market => {
            params.push(("quantity", quantity));
        }
        OrderKind::Limit { price } => {
            params.push(("timeInForce", TimeInForce::GoodTilCancelled.as_str().to_string()));
            params.push(("quantity", quantity));
            params.push(("price", price.normalize().to_string()));
        }
        OrderKind::StopLimit { price, stop_price } => {
            params.push(("timeInForce", TimeInForce::GoodTilCancelled.as_str().to_string()));
            params.push(("quantity", quantity));
            params.push(("price", price.normalize().to_string()));
            params.push(("stopPrice", stop_price.normalize().to_string()));
        }
    }

    // Non-MARKET/LIMIT types otherwise get an ACK body without status
    params.push(("newOrderRespType", ORDER_RESPONSE_TYPE.to_string()));
    params.push(("newClientOrderId", order.client_order_id.to_string()));
    params
}

impl<C: Clock> std::fmt::Debug for ExchangeClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeClient")
            .field("credentials", &self.credentials)
            .field("time", &self.time)
            .field("settings", &self.settings)
            .finish()
    }
}
