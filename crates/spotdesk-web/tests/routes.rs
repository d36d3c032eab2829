//! Router tests against a scripted exchange.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use spotdesk_exchange::{paths, ApiCredentials, ExchangeClient, HttpMethod, MockTransport};
use spotdesk_web::{create_router, AppState, HealthStatus, ServerConfig};
use tower::ServiceExt;

fn app(mock: &Arc<MockTransport>) -> Router {
    let client = ExchangeClient::with_system_clock(
        mock.clone(),
        ApiCredentials::new("test-key".into(), "test-secret".into()),
    );
    create_router(AppState::new(Arc::new(client), ServerConfig::default()))
}

fn form_post(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/place_order")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_serves_form() {
    let mock = Arc::new(MockTransport::new());
    let response = app(&mock).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"action="/place_order""#));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_market_buy_renders_order_id() {
    let mock = Arc::new(MockTransport::new());
    mock.push_json(
        HttpMethod::Post,
        paths::ORDER,
        r#"{"orderId":1,"status":"FILLED","executedQty":"0.01"}"#,
    );

    let response = app(&mock)
        .oneshot(form_post("symbol=BTCUSDT&quantity=0.01&order_type=MARKET&side=BUY"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Order placed"));
    assert!(html.contains(r#"<td class="order-id">1</td>"#));
    assert!(html.contains(r#"<td class="status">FILLED</td>"#));

    let sent = mock.requests_to(HttpMethod::Post, paths::ORDER);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].param("type"), Some("MARKET"));
    assert_eq!(sent[0].param("quantity"), Some("0.01"));
}

#[tokio::test]
async fn test_invalid_form_lists_violations_without_exchange_call() {
    let mock = Arc::new(MockTransport::new());

    let response = app(&mock)
        .oneshot(form_post("symbol=btc&quantity=0&order_type=LIMIT&side=BUY&price="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Invalid symbol format. Use uppercase format like BTCUSDT"));
    assert!(html.contains("Quantity must be positive and at least 0.0001"));
    assert!(html.contains("Price is required for limit orders and must be positive"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_exchange_rejection_shows_friendly_message() {
    let mock = Arc::new(MockTransport::new());
    mock.push_api_error(
        HttpMethod::Post,
        paths::ORDER,
        -2010,
        "Account has insufficient balance for requested action.",
    );

    let response = app(&mock)
        .oneshot(form_post(
            "symbol=ethusdt&quantity=5&order_type=limit&side=sell&price=2500",
        ))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains("Order failed"));
    assert!(html.contains("Insufficient balance for this order."));
    assert!(html.contains(r#"<td class="symbol">ETHUSDT</td>"#));
    assert!(html.contains(r#"<td class="price">2500</td>"#));
}

#[tokio::test]
async fn test_stop_limit_retry_through_form() {
    let mock = Arc::new(MockTransport::new());
    mock.push_api_error(
        HttpMethod::Post,
        paths::ORDER,
        -1021,
        "Timestamp for this request is outside of the recvWindow.",
    );
    mock.push_json(
        HttpMethod::Post,
        paths::ORDER,
        r#"{
            "symbol": "BTCUSDT",
            "orderId": 9,
            "orderListId": -1,
            "clientOrderId": "spotdesk_1700000000000_a1b2c3d4",
            "transactTime": 1700000000042,
            "price": "29000.00000000",
            "origQty": "0.50000000",
            "executedQty": "0.00000000",
            "cummulativeQuoteQty": "0.00000000",
            "status": "NEW",
            "timeInForce": "GTC",
            "type": "STOP_LOSS_LIMIT",
            "side": "SELL",
            "stopPrice": "29100.00000000",
            "workingTime": -1,
            "fills": []
        }"#,
    );
    mock.push_json(HttpMethod::Get, paths::TIME, r#"{"serverTime":1700000000000}"#);

    let response = app(&mock)
        .oneshot(form_post(
            "symbol=BTCUSDT&quantity=0.5&order_type=STOP_LIMIT&side=SELL&price=29000&stop_price=29100",
        ))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains(r#"<td class="order-id">9</td>"#));
    assert!(html.contains(r#"<td class="status">NEW</td>"#));

    let orders = mock.requests_to(HttpMethod::Post, paths::ORDER);
    assert_eq!(orders.len(), 2);
    for request in &orders {
        assert_eq!(request.param("newOrderRespType"), Some("FULL"));
    }
    assert_eq!(mock.requests_to(HttpMethod::Get, paths::TIME).len(), 1);
}

#[tokio::test]
async fn test_balance_api_zero_fills_unheld_asset() {
    let mock = Arc::new(MockTransport::new());
    mock.push_json(
        HttpMethod::Get,
        paths::ACCOUNT,
        r#"{"balances":[{"asset":"BTC","free":"1","locked":"0"}]}"#,
    );

    let response = app(&mock).oneshot(get("/api/balance?asset=xyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let balances: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(balances.as_array().unwrap().len(), 1);
    assert_eq!(balances[0]["asset"], "XYZ");
}

#[tokio::test]
async fn test_query_failure_is_bad_gateway() {
    let mock = Arc::new(MockTransport::new());
    mock.push_api_error(HttpMethod::Get, paths::ACCOUNT, -2015, "Invalid API-key, IP, or permissions for action.");

    let response = app(&mock).oneshot(get("/api/account")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        body["error"],
        "Failed to get account info: Binance API error -2015: Invalid API-key, IP, or permissions for action."
    );
}

#[tokio::test]
async fn test_cancel_order_api() {
    let mock = Arc::new(MockTransport::new());
    mock.push_json(
        HttpMethod::Delete,
        paths::ORDER,
        r#"{"symbol":"BTCUSDT","orderId":77,"status":"CANCELED","type":"LIMIT","side":"BUY","price":"30000","origQty":"0.01","executedQty":"0"}"#,
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/cancel_order")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"symbol":"btcusdt","order_id":77}"#))
        .unwrap();
    let response = app(&mock).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = mock.requests_to(HttpMethod::Delete, paths::ORDER);
    assert_eq!(sent[0].param("symbol"), Some("BTCUSDT"));
    assert_eq!(sent[0].param("orderId"), Some("77"));
}

#[tokio::test]
async fn test_health_reports_connectivity() {
    let mock = Arc::new(MockTransport::new());
    mock.push_json(HttpMethod::Get, paths::PING, "{}");

    let response = app(&mock).oneshot(get("/api/health")).await.unwrap();
    let health: HealthStatus = serde_json::from_str(&body_text(response).await).unwrap();

    assert!(health.connected);
    assert_eq!(health.time_offset_ms, 0);
    assert_eq!(health.last_sync_ms, None);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let mock = Arc::new(MockTransport::new());
    let router = app(&mock);

    router
        .clone()
        .oneshot(form_post("symbol=bad&quantity=x&order_type=MARKET&side=BUY"))
        .await
        .unwrap();
    let response = router.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("spotdesk_validation_rejected_total"));
}
