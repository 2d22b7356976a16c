//! OKX extension adapter.
//!
//! OKX namespaces its Bitcoin surface under `bitcoin.*` and wraps connect
//! results in an object carrying the active address.

use async_trait::async_trait;
use serde_json::json;

use crate::error::WalletError;

use super::bridge::BridgeRpc;
use super::{BtcBalance, WalletProvider};

pub struct OkxProvider {
    rpc: BridgeRpc,
}

impl OkxProvider {
    pub fn new(bridge_url: &str) -> Self {
        Self {
            rpc: BridgeRpc::new(bridge_url),
        }
    }
}

#[async_trait]
impl WalletProvider for OkxProvider {
    fn name(&self) -> &'static str {
        "okx"
    }

    async fn connect(&self) -> Result<Vec<String>, WalletError> {
        let result = self.rpc.call("bitcoin.connect", json!({})).await?;
        let address = result
            .get("address")
            .and_then(|v| v.as_str())
            .ok_or_else(|| WalletError::Wallet("okx connect returned no address".to_string()))?;
        Ok(vec![address.to_string()])
    }

    async fn get_public_key(&self) -> Result<String, WalletError> {
        self.rpc.call_string("bitcoin.getPublicKey", json!({})).await
    }

    async fn get_balance(&self) -> Result<BtcBalance, WalletError> {
        let value = self.rpc.call("bitcoin.getBalance", json!({})).await?;
        serde_json::from_value(value)
            .map_err(|e| WalletError::Wallet(format!("malformed okx balance: {}", e)))
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        self.rpc
            .call_string("bitcoin.signMessage", json!({ "message": message }))
            .await
    }

    async fn sign_psbt(&self, psbt_hex: &str) -> Result<String, WalletError> {
        self.rpc
            .call_string("bitcoin.signPsbt", json!({ "psbt": psbt_hex }))
            .await
    }

    async fn push_tx(&self, raw_tx_hex: &str) -> Result<String, WalletError> {
        self.rpc
            .call_string("bitcoin.pushTx", json!({ "rawTx": raw_tx_hex }))
            .await
    }

    async fn push_psbt(&self, psbt_hex: &str) -> Result<String, WalletError> {
        self.rpc
            .call_string("bitcoin.pushPsbt", json!({ "psbt": psbt_hex }))
            .await
    }
}
