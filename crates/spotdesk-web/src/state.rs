//! Shared state for axum handlers.

use std::sync::Arc;

use spotdesk_exchange::ExchangeClient;

use crate::config::ServerConfig;

/// Cloned into every handler; the client itself is shared.
#[derive(Clone)]
pub struct AppState {
    client: Arc<ExchangeClient>,
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(client: Arc<ExchangeClient>, config: ServerConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    pub fn client(&self) -> &ExchangeClient {
        &self.client
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
