//! Shared RPC transport to the local extension bridge.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WalletError;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// One POST per call; a reported error (extension missing, user declined)
/// comes back as `WalletError::Wallet` with the extension's own message.
pub struct BridgeRpc {
    http: reqwest::Client,
    endpoint: String,
}

impl BridgeRpc {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn call(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        log::debug!("Bridge call: {}", method);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&RpcRequest { method, params })
            .send()
            .await
            .map_err(|e| WalletError::Wallet(format!("extension bridge unreachable: {}", e)))?;

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| WalletError::Wallet(format!("unreadable bridge response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(WalletError::Wallet(error));
        }

        body.result
            .ok_or_else(|| WalletError::Wallet(format!("empty response for {}", method)))
    }

    /// Call expecting a bare string result.
    pub async fn call_string(&self, method: &str, params: Value) -> Result<String, WalletError> {
        let value = self.call(method, params).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| WalletError::Wallet(format!("non-string response for {}", method)))
    }
}
