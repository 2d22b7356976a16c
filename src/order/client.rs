use crate::error::WalletError;
use crate::orchestrator::TransactionIntent;

use super::types::{OrderRequest, OrderResponse, RawOrder};

/// Client for the remote funding/order service.
///
/// Submits a canonical transaction intent and returns the raw PSBT the
/// service assembled. No retry at this boundary: resubmission is not
/// provably idempotent, so every retry must come from a fresh user intent.
pub struct OrderClient {
    http: reqwest::Client,
    base_url: String,
}

impl OrderClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn create_order(&self, intent: &TransactionIntent) -> Result<RawOrder, WalletError> {
        let request = OrderRequest::from_intent(intent);
        let url = format!("{}/create", self.base_url);

        log::debug!(
            "Submitting {} order for {} ({} units) to {}",
            request.op,
            request.asset,
            request.quantity,
            url
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?;

        let status = response.status();
        let body: OrderResponse = response
            .json()
            .await
            .map_err(|e| WalletError::Network(format!("unreadable order response: {}", e)))?;

        // A structured failure is surfaced verbatim, whatever the status code.
        if let Some(error) = body.error {
            return Err(WalletError::Upstream(error));
        }
        if !status.is_success() {
            return Err(WalletError::Upstream(format!(
                "order service returned HTTP {}",
                status
            )));
        }

        match body.result.and_then(|r| r.psbt).filter(|p| !p.is_empty()) {
            Some(psbt_base64) => {
                log::debug!("Order accepted, PSBT is {} base64 chars", psbt_base64.len());
                Ok(RawOrder { psbt_base64 })
            }
            // Nominal success without the PSBT payload is a contract
            // violation, distinct from an upstream-reported failure.
            None => Err(WalletError::ConstructionFailed),
        }
    }
}
