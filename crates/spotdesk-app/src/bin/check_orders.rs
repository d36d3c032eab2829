//! Print open orders and an account summary.

use anyhow::Result;
use clap::Parser;
use spotdesk_app::report::{account_report, open_orders_report};
use spotdesk_app::{AppConfig, Application};

/// List open orders and account balances on the spot testnet
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SPOTDESK_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Only list open orders for this symbol
    #[arg(short, long)]
    symbol: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    spotdesk_app::config::load_env_file(None);
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let args = Args::parse();
    let config = AppConfig::load(&AppConfig::resolve_path(args.config))?;
    let app = Application::from_env(config)?;
    let client = app.client();

    client.sync_time().await;

    let symbol = args.symbol.map(|s| s.trim().to_ascii_uppercase());
    let orders = client.get_open_orders(symbol.as_deref()).await?;
    println!("{}", open_orders_report(&orders));

    let account = client.get_account_info().await?;
    println!("{}", account_report(&account));

    Ok(())
}
