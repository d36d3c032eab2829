//! HTTP server implementation using axum.

use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::{Deserialize, Serialize};
use spotdesk_core::{validate_order, OrderForm};
use spotdesk_exchange::{
    AccountInfo, Balance, OrderBook, OrderSnapshot, TickerPrice, DEFAULT_ORDER_BOOK_LIMIT,
};
use spotdesk_telemetry::{
    encode_metrics, log_error, log_trade_attempt, log_trade_failure, log_trade_result,
    log_validation_rejected, metrics_content_type, Metrics, OUTCOME_FAILURE, OUTCOME_SUCCESS,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ApiError, WebError, WebResult};
use crate::render::{self, Outcome, ResultPage};
use crate::state::AppState;

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/", get(serve_index))
        .route("/place_order", post(place_order))
        .route("/api/account", get(get_account))
        .route("/api/balance", get(get_balance))
        .route("/api/ticker", get(get_ticker))
        .route("/api/order_book", get(get_order_book))
        .route("/api/open_orders", get(get_open_orders))
        .route("/api/cancel_order", post(cancel_order))
        .route("/api/health", get(health))
        .route("/metrics", get(metrics))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the order form.
async fn serve_index() -> Html<String> {
    Html(render::order_form(&[], None))
}

/// Validate the submitted form and, if it is valid, place the order.
///
/// Invalid input never reaches the exchange; the form comes back with the
/// violations listed. Exchange failures are shown on the result page.
async fn place_order(State(state): State<AppState>, Form(form): Form<OrderForm>) -> Html<String> {
    let order = match validate_order(&form) {
        Ok(order) => order,
        Err(e) => {
            Metrics::validation_rejected();
            log_validation_rejected(&form, e.messages());
            return Html(render::order_form(e.messages(), Some(&form)));
        }
    };

    log_trade_attempt(&order);
    let order_type = order.order_type().as_str();
    Metrics::order_attempt(order_type);

    let started = Instant::now();
    let placed = state.client().place_order(&order).await;
    Metrics::order_latency(order_type, started.elapsed().as_secs_f64() * 1000.0);

    let outcome = match placed {
        Ok(result) => {
            Metrics::order_result(OUTCOME_SUCCESS);
            log_trade_result(&result);
            Outcome::Placed(result)
        }
        Err(e) => {
            Metrics::order_result(OUTCOME_FAILURE);
            log_trade_failure(&order, &e.to_string());
            Outcome::Failed(e.user_message())
        }
    };

    Html(render::result_page(&ResultPage {
        trade_data: order,
        outcome,
    }))
}

// ============================================================================
// JSON query API
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    pub asset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderBookQuery {
    pub symbol: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderBody {
    pub symbol: String,
    pub order_id: u64,
}

/// Exchange reachability and clock state.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub connected: bool,
    pub time_offset_ms: i64,
    pub last_sync_ms: Option<i64>,
}

fn normalize_symbol(symbol: Option<String>) -> Option<String> {
    symbol
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
}

async fn get_account(State(state): State<AppState>) -> Result<Json<AccountInfo>, ApiError> {
    Ok(Json(state.client().get_account_info().await?))
}

async fn get_balance(
    State(state): State<AppState>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<Vec<Balance>>, ApiError> {
    let asset = normalize_symbol(query.asset);
    Ok(Json(state.client().get_balance(asset.as_deref()).await?))
}

async fn get_ticker(
    State(state): State<AppState>,
    Query(query): Query<SymbolQuery>,
) -> Result<Json<Vec<TickerPrice>>, ApiError> {
    let symbol = normalize_symbol(query.symbol);
    Ok(Json(state.client().get_ticker_price(symbol.as_deref()).await?))
}

async fn get_order_book(
    State(state): State<AppState>,
    Query(query): Query<OrderBookQuery>,
) -> Result<Json<OrderBook>, ApiError> {
    let symbol = query.symbol.trim().to_ascii_uppercase();
    let limit = query.limit.unwrap_or(DEFAULT_ORDER_BOOK_LIMIT);
    Ok(Json(state.client().get_order_book(&symbol, limit).await?))
}

async fn get_open_orders(
    State(state): State<AppState>,
    Query(query): Query<SymbolQuery>,
) -> Result<Json<Vec<OrderSnapshot>>, ApiError> {
    let symbol = normalize_symbol(query.symbol);
    Ok(Json(state.client().get_open_orders(symbol.as_deref()).await?))
}

async fn cancel_order(
    State(state): State<AppState>,
    Json(body): Json<CancelOrderBody>,
) -> Result<Json<OrderSnapshot>, ApiError> {
    let symbol = body.symbol.trim().to_ascii_uppercase();
    match state.client().cancel_order(&symbol, body.order_id).await {
        Ok(cancelled) => Ok(Json(cancelled)),
        Err(e) => {
            log_error("Order cancellation failed", Some(&e.to_string()));
            Err(e.into())
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let client = state.client();
    Json(HealthStatus {
        connected: client.test_connectivity().await,
        time_offset_ms: client.time_offset_ms(),
        last_sync_ms: client.last_sync_ms(),
    })
}

/// Prometheus text exposition.
async fn metrics() -> Response {
    match encode_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics_content_type())], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Run the HTTP server until it fails.
pub async fn run_server(state: AppState, config: &ServerConfig) -> WebResult<()> {
    let addr = config.bind_addr()?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| WebError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    info!(
        addr = %addr,
        static_dir = %config.static_dir.display(),
        "Starting web server"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
