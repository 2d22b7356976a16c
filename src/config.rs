/// Pipeline configuration from environment variables
///
/// Controls the Bitcoin network, the funding-service endpoint and the
/// extension-bridge endpoint. Defaults to mainnet, where the token
/// protocol lives.
use std::env;

#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// Bitcoin network type
    pub network: bitcoin::Network,
    /// Funding/order service base URL
    pub order_api_url: String,
    /// Local extension-bridge base URL (wallet provider RPC)
    pub bridge_url: String,
}

impl WalletConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `BITCOIN_NETWORK`: "mainnet" (default), "signet" or "regtest"
    /// - `ORDER_API_URL`: funding-service endpoint
    /// - `BRIDGE_URL`: wallet extension bridge endpoint
    pub fn from_env() -> Self {
        let network_str = env::var("BITCOIN_NETWORK")
            .unwrap_or_else(|_| "mainnet".to_string())
            .to_lowercase();

        let network = match network_str.as_str() {
            "mainnet" | "" => bitcoin::Network::Bitcoin,
            "signet" => {
                log::info!("Using SIGNET network");
                bitcoin::Network::Signet
            }
            "regtest" => {
                log::info!("Using REGTEST network");
                bitcoin::Network::Regtest
            }
            other => {
                log::warn!("Unknown network '{}', defaulting to mainnet", other);
                bitcoin::Network::Bitcoin
            }
        };

        let order_api_url = env::var("ORDER_API_URL")
            .unwrap_or_else(|_| "https://stampchain.io/api".to_string());
        log::info!("Order service: {}", order_api_url);

        let bridge_url =
            env::var("BRIDGE_URL").unwrap_or_else(|_| "http://localhost:4001".to_string());
        log::info!("Extension bridge: {}", bridge_url);

        Self {
            network,
            order_api_url,
            bridge_url,
        }
    }

    /// Human-readable network label, as reported in wallet sessions
    pub fn network_label(&self) -> &'static str {
        match self.network {
            bitcoin::Network::Bitcoin => "mainnet",
            bitcoin::Network::Signet => "signet",
            bitcoin::Network::Testnet => "testnet",
            _ => "regtest",
        }
    }
}

impl Default for WalletConfig {
    /// Default configuration (mainnet)
    fn default() -> Self {
        Self {
            network: bitcoin::Network::Bitcoin,
            order_api_url: "https://stampchain.io/api".to_string(),
            bridge_url: "http://localhost:4001".to_string(),
        }
    }
}
