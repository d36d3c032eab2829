//! Trade event logging.
//!
//! Every order attempt, outcome and rejection goes through here so the
//! trade log file reads as one consistent audit trail.

use spotdesk_core::{OrderForm, OrderRequest, OrderResult};
use tracing::{error, info, warn};

/// Target for trade events, so they can be filtered separately.
pub const TRADE_TARGET: &str = "spotdesk::trade";

pub fn log_trade_attempt(order: &OrderRequest) {
    info!(
        target: TRADE_TARGET,
        timestamp = %chrono::Utc::now().to_rfc3339(),
        symbol = %order.symbol,
        side = %order.side,
        order_type = %order.order_type(),
        quantity = %order.quantity,
        price = ?order.price(),
        stop_price = ?order.stop_price(),
        client_order_id = %order.client_order_id,
        "Trade attempt"
    );
}

pub fn log_trade_result(result: &OrderResult) {
    info!(
        target: TRADE_TARGET,
        timestamp = %chrono::Utc::now().to_rfc3339(),
        success = true,
        order_id = result.order_id,
        status = %result.status,
        executed_qty = %result.executed_qty,
        avg_price = ?result.avg_price,
        "Trade result"
    );
}

/// The exchange refused the order or could not be reached.
pub fn log_trade_failure(order: &OrderRequest, message: &str) {
    error!(
        target: TRADE_TARGET,
        timestamp = %chrono::Utc::now().to_rfc3339(),
        success = false,
        symbol = %order.symbol,
        client_order_id = %order.client_order_id,
        error = %message,
        "Trade result"
    );
}

/// Bad user input: logged at warn, never as a system fault.
pub fn log_validation_rejected(form: &OrderForm, violations: &[String]) {
    warn!(
        target: TRADE_TARGET,
        symbol = %form.symbol,
        order_type = %form.order_type,
        side = %form.side,
        violations = ?violations,
        "Order form rejected"
    );
}

pub fn log_error(message: &str, details: Option<&str>) {
    match details {
        Some(details) => error!(target: TRADE_TARGET, details = %details, "{message}"),
        None => error!(target: TRADE_TARGET, "{message}"),
    }
}
