use std::str::FromStr;
use std::sync::Arc;

use axum::{extract::State, Json};
use bitcoin::Address;

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::fees::FeeRate;
use crate::orchestrator::{OperationKind, TransactionIntent};
use crate::order::OrderClient;
use crate::psbt::{self, ProcessOptions, ProcessedPsbt};

use super::types::{CreateMintRequest, CreateSendRequest};

pub struct AppState {
    pub config: WalletConfig,
    pub order_client: OrderClient,
}

impl AppState {
    pub fn new(config: WalletConfig) -> Self {
        let order_client = OrderClient::new(config.order_api_url.clone());
        Self {
            config,
            order_client,
        }
    }
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Compose a token send: validate, order, post-process. The fee rate and
/// both addresses are checked before the funding service is contacted.
pub async fn create_send_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSendRequest>,
) -> Result<Json<ProcessedPsbt>, WalletError> {
    let fee_rate = FeeRate::from_fee_per_kvb(request.options.fee_per_kb)?;
    check_address(&state, &request.address)?;
    check_address(&state, &request.destination)?;

    let intent = TransactionIntent::new(
        request.address.clone(),
        request.destination,
        request.asset,
        request.quantity,
        fee_rate,
        OperationKind::Send,
    );

    let raw = state.order_client.create_order(&intent).await?;
    let processed = psbt::process(
        &raw,
        &request.address,
        state.config.network,
        fee_rate,
        &ProcessOptions::default(),
    )?;

    Ok(Json(processed))
}

/// Compose a token mint. The change address funds the mint and receives
/// change; the destination receives the minted balance.
pub async fn create_mint_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMintRequest>,
) -> Result<Json<ProcessedPsbt>, WalletError> {
    let fee_rate = FeeRate::from_control(request.fee_rate)?;
    check_address(&state, &request.to_address)?;
    check_address(&state, &request.change_address)?;

    let intent = TransactionIntent::new(
        request.change_address.clone(),
        request.to_address,
        request.tick,
        request.amt,
        fee_rate,
        OperationKind::Mint,
    );

    let raw = state.order_client.create_order(&intent).await?;
    let processed = psbt::process(
        &raw,
        &request.change_address,
        state.config.network,
        fee_rate,
        &ProcessOptions::default(),
    )?;

    Ok(Json(processed))
}

fn check_address(state: &AppState, address: &str) -> Result<(), WalletError> {
    Address::from_str(address)
        .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))?
        .require_network(state.config.network)
        .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))?;
    Ok(())
}
