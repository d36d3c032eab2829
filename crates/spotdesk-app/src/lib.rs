//! spotdesk application.
//!
//! Wires configuration, credentials, logging and the exchange client into
//! the web server, and backs the `check-orders` CLI.

pub mod app;
pub mod config;
pub mod error;
pub mod report;

pub use app::Application;
pub use config::{AppConfig, ExchangeConfig};
pub use error::{AppError, AppResult};
