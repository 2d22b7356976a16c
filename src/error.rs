use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid fee rate: {0}")]
    InvalidFeeRate(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Order service error: {0}")]
    Upstream(String),

    #[error("Order service reported success but returned no PSBT")]
    ConstructionFailed,

    #[error("Invalid PSBT: {0}")]
    InvalidPsbt(String),

    #[error("Fee mismatch: requested {requested} sat/kvB, PSBT implies {actual} sat/kvB")]
    FeeMismatch { requested: u64, actual: u64 },

    #[error("Dust violation: output {vout} pays {value} sats, below the {limit} sat floor")]
    DustViolation { vout: usize, value: u64, limit: u64 },

    #[error("Wallet provider not available: {0}")]
    ProviderUnavailable(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("A signing session is already in flight")]
    Busy,

    #[error("Intent superseded by a newer submission")]
    Superseded,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for WalletError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            WalletError::InvalidFeeRate(_)
            | WalletError::InvalidAddress(_)
            | WalletError::InvalidInput(_)
            | WalletError::InvalidPsbt(_)
            | WalletError::DustViolation { .. }
            | WalletError::ProviderUnavailable(_)
            | WalletError::Wallet(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            WalletError::Upstream(_)
            | WalletError::ConstructionFailed
            | WalletError::FeeMismatch { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            WalletError::Busy | WalletError::Superseded => {
                (StatusCode::CONFLICT, self.to_string())
            }
            WalletError::Network(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            WalletError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
