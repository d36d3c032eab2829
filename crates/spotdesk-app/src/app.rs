//! Application wiring.
//!
//! Builds the exchange client from config and credentials, runs the
//! startup checks, then hands the client to the web server.

use std::sync::Arc;

use spotdesk_exchange::{
    ApiCredentials, DynTransport, ExchangeClient, HttpTransport, SystemClock,
};
use spotdesk_web::AppState;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;

/// Main application.
pub struct Application {
    config: AppConfig,
    client: Arc<ExchangeClient>,
}

impl Application {
    /// Create an application with credentials from the environment.
    ///
    /// Missing `API_KEY` or `API_SECRET` is fatal.
    pub fn from_env(config: AppConfig) -> AppResult<Self> {
        let credentials = ApiCredentials::from_env()?;
        Self::new(config, credentials)
    }

    pub fn new(config: AppConfig, credentials: ApiCredentials) -> AppResult<Self> {
        let transport: DynTransport = Arc::new(HttpTransport::new(
            config.exchange.base_url.clone(),
            config.exchange.timeout(),
        )?);
        Ok(Self::with_transport(config, transport, credentials))
    }

    /// Create an application over a custom transport.
    pub fn with_transport(
        config: AppConfig,
        transport: DynTransport,
        credentials: ApiCredentials,
    ) -> Self {
        info!(
            base_url = %config.exchange.base_url,
            api_key = %credentials.api_key_hint(),
            "Exchange client configured"
        );
        let client = ExchangeClient::new(
            transport,
            credentials,
            SystemClock,
            config.exchange.settings(),
        );
        Self {
            config,
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &Arc<ExchangeClient> {
        &self.client
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check connectivity and synchronize the clock offset.
    ///
    /// Neither failure stops startup: placement resyncs on demand.
    pub async fn startup(&self) {
        if self.client.test_connectivity().await {
            info!("Exchange reachable");
        } else {
            warn!(
                base_url = %self.config.exchange.base_url,
                "Exchange ping failed, continuing"
            );
        }

        match self.client.sync_time().await {
            Some(offset_ms) => info!(offset_ms, "Initial time sync complete"),
            None => warn!("Initial time sync failed, using local clock"),
        }
    }

    /// Serve the web front end until the server stops.
    pub async fn run(self) -> AppResult<()> {
        let state = AppState::new(Arc::clone(&self.client), self.config.server.clone());
        spotdesk_web::run_server(state, &self.config.server).await?;
        Ok(())
    }
}
