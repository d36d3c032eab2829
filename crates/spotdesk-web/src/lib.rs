//! Web front end for spotdesk.
//!
//! Serves the order form, validates submissions, forwards valid orders to
//! the exchange and renders the outcome. Also exposes the pass-through
//! account and market queries as JSON, plus `/metrics`.

pub mod config;
pub mod error;
pub mod render;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, WebError, WebResult};
pub use server::{create_router, run_server, HealthStatus};
pub use state::AppState;
