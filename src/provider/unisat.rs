//! Unisat extension adapter.
//!
//! Unisat exposes flat, unnamespaced methods; `requestAccounts` returns the
//! account list directly.

use async_trait::async_trait;
use serde_json::json;

use crate::error::WalletError;

use super::bridge::BridgeRpc;
use super::{BtcBalance, WalletProvider};

pub struct UnisatProvider {
    rpc: BridgeRpc,
}

impl UnisatProvider {
    pub fn new(bridge_url: &str) -> Self {
        Self {
            rpc: BridgeRpc::new(bridge_url),
        }
    }
}

#[async_trait]
impl WalletProvider for UnisatProvider {
    fn name(&self) -> &'static str {
        "unisat"
    }

    async fn connect(&self) -> Result<Vec<String>, WalletError> {
        let result = self.rpc.call("requestAccounts", json!({})).await?;
        serde_json::from_value(result)
            .map_err(|e| WalletError::Wallet(format!("malformed unisat accounts: {}", e)))
    }

    async fn get_public_key(&self) -> Result<String, WalletError> {
        self.rpc.call_string("getPublicKey", json!({})).await
    }

    async fn get_balance(&self) -> Result<BtcBalance, WalletError> {
        let value = self.rpc.call("getBalance", json!({})).await?;
        serde_json::from_value(value)
            .map_err(|e| WalletError::Wallet(format!("malformed unisat balance: {}", e)))
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        self.rpc
            .call_string("signMessage", json!({ "message": message }))
            .await
    }

    async fn sign_psbt(&self, psbt_hex: &str) -> Result<String, WalletError> {
        self.rpc
            .call_string("signPsbt", json!({ "psbt": psbt_hex }))
            .await
    }

    async fn push_tx(&self, raw_tx_hex: &str) -> Result<String, WalletError> {
        self.rpc
            .call_string("pushTx", json!({ "rawTx": raw_tx_hex }))
            .await
    }

    async fn push_psbt(&self, psbt_hex: &str) -> Result<String, WalletError> {
        self.rpc
            .call_string("pushPsbt", json!({ "psbt": psbt_hex }))
            .await
    }
}
