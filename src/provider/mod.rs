//! Uniform capability contract over heterogeneous signing extensions.
//!
//! The pipeline depends only on [`WalletProvider`]; each supported extension
//! brand gets one adapter that maps the contract onto that brand's RPC
//! envelope. Adapters are registered at startup in a [`ProviderRegistry`],
//! so an absent extension is a typed error, not a scattered existence check.

pub mod bridge;
pub mod okx;
pub mod registry;
pub mod unisat;

pub use okx::OkxProvider;
pub use registry::ProviderRegistry;
pub use unisat::UnisatProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// Bitcoin balance as reported by a wallet extension, in satoshis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BtcBalance {
    pub confirmed: u64,
    pub unconfirmed: u64,
    pub total: u64,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Brand name, e.g. "okx"
    fn name(&self) -> &'static str;

    /// Request access; returns the extension's accounts (first is active).
    async fn connect(&self) -> Result<Vec<String>, WalletError>;

    async fn get_public_key(&self) -> Result<String, WalletError>;

    async fn get_balance(&self) -> Result<BtcBalance, WalletError>;

    async fn sign_message(&self, message: &str) -> Result<String, WalletError>;

    /// Sign a PSBT (hex); returns the signed PSBT hex.
    async fn sign_psbt(&self, psbt_hex: &str) -> Result<String, WalletError>;

    /// Broadcast a raw signed transaction; returns the txid.
    async fn push_tx(&self, raw_tx_hex: &str) -> Result<String, WalletError>;

    /// Finalize and broadcast a signed PSBT; returns the txid.
    async fn push_psbt(&self, psbt_hex: &str) -> Result<String, WalletError>;
}
