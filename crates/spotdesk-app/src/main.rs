//! spotdesk - spot testnet order desk entry point.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

/// Web order desk for the spot testnet
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SPOTDESK_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env may set SPOTDESK_CONFIG and RUST_LOG
    let env_file = spotdesk_app::config::load_env_file(None);
    let args = Args::parse();

    // Config first: it names the log file
    let config_path = spotdesk_app::AppConfig::resolve_path(args.config);
    let config = spotdesk_app::AppConfig::load(&config_path)?;

    spotdesk_telemetry::init_logging(&config.logging)?;
    info!("Starting spotdesk v{}", env!("CARGO_PKG_VERSION"));
    if let Some(env_file) = &env_file {
        info!(env_file = %env_file.display(), "Environment file loaded");
    }

    if config_path.exists() {
        info!(config_path = %config_path.display(), "Configuration loaded");
    } else {
        warn!(config_path = %config_path.display(), "Config file not found, using defaults");
    }

    let app = spotdesk_app::Application::from_env(config)?;
    app.startup().await;
    app.run().await?;

    Ok(())
}
