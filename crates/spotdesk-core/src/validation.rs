//! Order form validation.
//!
//! Pure checks over the raw form fields. [`validate_order`] runs every check
//! and reports all violations together instead of stopping at the first one.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::order::{OrderKind, OrderRequest, OrderSide, OrderType};

/// Smallest accepted order quantity.
pub const MIN_QUANTITY: Decimal = dec!(0.0001);

pub const MSG_INVALID_SYMBOL: &str = "Invalid symbol format. Use uppercase format like BTCUSDT";
pub const MSG_INVALID_QUANTITY: &str = "Quantity must be positive and at least 0.0001";
pub const MSG_LIMIT_PRICE: &str = "Price is required for limit orders and must be positive";
pub const MSG_STOP_LIMIT_PRICE: &str =
    "Price is required for stop-limit orders and must be positive";
pub const MSG_STOP_PRICE: &str =
    "Stop price is required for stop-limit orders and must be positive";
pub const MSG_INVALID_ORDER_TYPE: &str = "Order type must be MARKET, LIMIT or STOP_LIMIT";
pub const MSG_INVALID_SIDE: &str = "Side must be BUY or SELL";

/// Raw order form as submitted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub order_type: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub stop_price: Option<String>,
}

/// Symbol check: at least three letters followed by `USD` or `USDT`.
///
/// Input is upper-cased before matching, so `btcusdt` passes.
pub fn validate_symbol(symbol: &str) -> bool {
    if symbol.is_empty() {
        return false;
    }
    let upper = symbol.to_ascii_uppercase();
    if !upper.bytes().all(|b| b.is_ascii_uppercase()) {
        return false;
    }

    ["USDT", "USD"].iter().any(|quote| {
        upper
            .strip_suffix(quote)
            .map(|base| base.len() >= 3)
            .unwrap_or(false)
    })
}

pub fn validate_quantity(quantity: Decimal) -> bool {
    quantity > Decimal::ZERO && quantity >= MIN_QUANTITY
}

/// Price is only mandatory for LIMIT orders; any other type passes.
pub fn validate_price(price: Option<Decimal>, order_type: OrderType) -> bool {
    match order_type {
        OrderType::Limit => price.map(|p| p > Decimal::ZERO).unwrap_or(false),
        _ => true,
    }
}

/// Parse a decimal form field. Blank input is treated as absent.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// Validate a whole form and build the order request.
pub fn validate_order(form: &OrderForm) -> Result<OrderRequest, ValidationError> {
    let mut violations = Vec::new();

    if !validate_symbol(form.symbol.trim()) {
        violations.push(MSG_INVALID_SYMBOL.to_string());
    }

    let quantity = parse_decimal(&form.quantity).filter(|q| validate_quantity(*q));
    if quantity.is_none() {
        violations.push(MSG_INVALID_QUANTITY.to_string());
    }

    let price = form.price.as_deref().and_then(parse_decimal);
    let stop_price = form.stop_price.as_deref().and_then(parse_decimal);

    let kind = match form.order_type.parse::<OrderType>() {
        Ok(OrderType::Market) => Some(OrderKind::Market),
        Ok(OrderType::Limit) => {
            if validate_price(price, OrderType::Limit) {
                price.map(|price| OrderKind::Limit { price })
            } else {
                violations.push(MSG_LIMIT_PRICE.to_string());
                None
            }
        }
        Ok(OrderType::StopLimit) => {
            let price = positive(price);
            if price.is_none() {
                violations.push(MSG_STOP_LIMIT_PRICE.to_string());
            }
            let stop_price = positive(stop_price);
            if stop_price.is_none() {
                violations.push(MSG_STOP_PRICE.to_string());
            }
            price
                .zip(stop_price)
                .map(|(price, stop_price)| OrderKind::StopLimit { price, stop_price })
        }
        Err(_) => {
            violations.push(MSG_INVALID_ORDER_TYPE.to_string());
            None
        }
    };

    let side = form.side.parse::<OrderSide>().ok();
    if side.is_none() {
        violations.push(MSG_INVALID_SIDE.to_string());
    }

    match (quantity, side, kind) {
        (Some(quantity), Some(side), Some(kind)) if violations.is_empty() => Ok(OrderRequest::new(
            form.symbol.trim(),
            side,
            quantity,
            kind,
        )),
        _ => Err(ValidationError::new(violations)),
    }
}
