use serde::Deserialize;

/// Body of `POST /api/v2/create/send`.
#[derive(Debug, Deserialize)]
pub struct CreateSendRequest {
    /// Funding source and change address
    pub address: String,
    pub destination: String,
    pub asset: String,
    pub quantity: u64,
    pub options: SendOptions,
}

#[derive(Debug, Deserialize)]
pub struct SendOptions {
    #[serde(default = "default_return_psbt")]
    pub return_psbt: bool,
    /// Sat per 1000 virtual bytes
    pub fee_per_kb: i64,
}

fn default_return_psbt() -> bool {
    true
}

/// Body of `POST /api/v2/create/mint`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMintRequest {
    pub to_address: String,
    pub change_address: String,
    pub tick: String,
    /// Raw fee-rate control value, tenths of sat/vB
    pub fee_rate: i64,
    pub amt: u64,
}
