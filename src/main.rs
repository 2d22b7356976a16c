use std::env;

use stamp_wallet::api::server;
use stamp_wallet::config::WalletConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let addr = env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let config = WalletConfig::from_env();

    log::info!("Starting token transaction pipeline server on {}", addr);
    server::start_server(&addr, config).await?;
    Ok(())
}
