//! Core domain types for spotdesk.
//!
//! This crate provides the types shared by the exchange client and the web
//! front-end:
//! - `OrderRequest`, `OrderKind`: a validated order
//! - `OrderSide`, `OrderType`, `TimeInForce`: trading enums
//! - `OrderResult`: outcome of a submission
//! - `validation`: form checks that collect every violation

pub mod error;
pub mod order;
pub mod validation;

pub use error::{CoreError, Result, ValidationError};
pub use order::{
    ClientOrderId, OrderKind, OrderRequest, OrderResult, OrderSide, OrderType, TimeInForce,
};
pub use validation::{
    validate_order, validate_price, validate_quantity, validate_symbol, OrderForm, MIN_QUANTITY,
};
