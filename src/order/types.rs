use serde::{Deserialize, Serialize};

use crate::fees::{FeeRate, DUST_LIMIT};
use crate::orchestrator::TransactionIntent;

/// Protocol defaults injected into every funding-service request.
///
/// Callers never assemble these fields by hand; `standard` is the single
/// source of the dust floor, the unconfirmed-input allowance and the
/// server-side validation flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOptions {
    pub return_psbt: bool,
    pub fee_per_kb: u64,
    pub regular_dust_size: u64,
    pub allow_unconfirmed_inputs: bool,
    pub validate: bool,
}

impl OrderOptions {
    pub fn standard(rate: FeeRate) -> Self {
        Self {
            return_psbt: true,
            fee_per_kb: rate.fee_per_kvb(),
            regular_dust_size: DUST_LIMIT,
            allow_unconfirmed_inputs: true,
            validate: true,
        }
    }
}

/// Wire request for the order endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub to_address: String,
    pub change_address: String,
    pub op: String,
    pub asset: String,
    /// Raw fee-rate control value, tenths of sat/vB
    pub fee_rate: u64,
    pub quantity: u64,
    pub options: OrderOptions,
}

impl OrderRequest {
    pub fn from_intent(intent: &TransactionIntent) -> Self {
        Self {
            to_address: intent.destination_address.clone(),
            change_address: intent.source_address.clone(),
            op: intent.kind.as_str().to_string(),
            asset: intent.asset_id.clone(),
            fee_rate: intent.fee_rate.control(),
            quantity: intent.quantity,
            options: OrderOptions::standard(intent.fee_rate),
        }
    }
}

/// Response envelope from the order endpoint.
#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub result: Option<OrderResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderResult {
    #[serde(default)]
    pub psbt: Option<String>,
}

/// Unprocessed PSBT as returned by the funding service (base64).
///
/// Transient: owned by a single flow, handed to the post-processor and
/// dropped.
#[derive(Debug, Clone)]
pub struct RawOrder {
    pub psbt_base64: String,
}
