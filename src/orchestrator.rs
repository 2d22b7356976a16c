//! Send/mint flow orchestration.
//!
//! One state machine per submitted intent. Every stage past `Calculating`
//! awaits an external party (funding service, signing extension, broadcast
//! network); after each await the flow re-checks that it is still the
//! current intent, so a response for a superseded intent is discarded on
//! arrival and never applied. Nothing is persisted before a successful
//! broadcast, so cancellation needs no rollback.

use std::str::FromStr;
use std::sync::Arc;

use bitcoin::{Address, Network, Txid};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use crate::error::WalletError;
use crate::fees::{self, FeeEstimate, FeeRate};
use crate::order::OrderClient;
use crate::psbt::{self, ProcessOptions, ProcessedPsbt};
use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Send,
    Mint,
    Dispense,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Send => "send",
            OperationKind::Mint => "mint",
            OperationKind::Dispense => "dispense",
        }
    }
}

/// A user's transaction intent. Immutable once submitted: editing the fee
/// rate or an address produces a new intent with a new id.
#[derive(Debug, Clone)]
pub struct TransactionIntent {
    pub id: Uuid,
    pub source_address: String,
    pub destination_address: String,
    pub asset_id: String,
    pub quantity: u64,
    pub fee_rate: FeeRate,
    pub kind: OperationKind,
}

impl TransactionIntent {
    pub fn new(
        source_address: String,
        destination_address: String,
        asset_id: String,
        quantity: u64,
        fee_rate: FeeRate,
        kind: OperationKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_address,
            destination_address,
            asset_id,
            quantity,
            fee_rate,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowState {
    Idle,
    Calculating,
    OrderRequested,
    PsbtValidating,
    AwaitingSignature,
    Broadcasting,
    Confirmed { txid: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowSnapshot {
    pub intent_id: Option<Uuid>,
    pub state: FlowState,
}

/// Result of a completed flow.
#[derive(Debug, Clone, Serialize)]
pub struct FlowOutcome {
    pub txid: String,
    pub estimate: FeeEstimate,
    pub processed: ProcessedPsbt,
}

pub struct Orchestrator {
    order_client: OrderClient,
    session: Arc<SessionManager>,
    network: Network,
    active: Mutex<Option<Uuid>>,
    state: watch::Sender<FlowSnapshot>,
}

impl Orchestrator {
    pub fn new(order_client: OrderClient, session: Arc<SessionManager>, network: Network) -> Self {
        let (state, _) = watch::channel(FlowSnapshot {
            intent_id: None,
            state: FlowState::Idle,
        });
        Self {
            order_client,
            session,
            network,
            active: Mutex::new(None),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> FlowState {
        self.state.borrow().state.clone()
    }

    /// Mark the in-flight intent superseded and reset to `Idle`. Called when
    /// the user edits the fee rate or an address, or cancels outright; the
    /// edited values arrive later as a brand-new intent.
    pub async fn supersede(&self) {
        let mut active = self.active.lock().await;
        if let Some(id) = active.take() {
            log::info!("Intent {} superseded", id);
        }
        self.state.send_replace(FlowSnapshot {
            intent_id: None,
            state: FlowState::Idle,
        });
    }

    /// Drive one intent through the full pipeline.
    ///
    /// Rejected with `Busy` while a live flow is awaiting a signature or
    /// broadcasting, so at most one signing session exists per user. A
    /// submission in any earlier stage is superseded by the newcomer
    /// (last-edit-wins).
    pub async fn submit(&self, intent: TransactionIntent) -> Result<FlowOutcome, WalletError> {
        {
            let mut active = self.active.lock().await;
            let signing = matches!(
                self.state.borrow().state,
                FlowState::AwaitingSignature | FlowState::Broadcasting
            );
            if active.is_some() && signing {
                return Err(WalletError::Busy);
            }
            *active = Some(intent.id);
        }

        let result = self.run(&intent).await;
        match &result {
            Ok(outcome) => {
                self.transition(
                    &intent,
                    FlowState::Confirmed {
                        txid: outcome.txid.clone(),
                    },
                )
                .await?;
                self.active.lock().await.take();
            }
            // Supersession already reset the observable state; the late
            // result is dropped here without being applied.
            Err(WalletError::Superseded) => {}
            // Wallet-side failures (extension absent, user declined,
            // mid-flow disconnect) surface to the user and return the flow
            // to Idle; everything else parks in Failed.
            Err(error @ (WalletError::Wallet(_) | WalletError::ProviderUnavailable(_))) => {
                log::warn!("Intent {} wallet failure: {}", intent.id, error);
                let mut active = self.active.lock().await;
                if *active == Some(intent.id) {
                    *active = None;
                }
                self.state.send_replace(FlowSnapshot {
                    intent_id: None,
                    state: FlowState::Idle,
                });
            }
            Err(error) => {
                let _ = self
                    .transition(
                        &intent,
                        FlowState::Failed {
                            reason: error.to_string(),
                        },
                    )
                    .await;
                let mut active = self.active.lock().await;
                if *active == Some(intent.id) {
                    *active = None;
                }
            }
        }
        result
    }

    async fn run(&self, intent: &TransactionIntent) -> Result<FlowOutcome, WalletError> {
        // Pre-flight: both addresses must parse for this network before any
        // network call. The fee rate was validated when the intent was built.
        self.check_address(&intent.source_address)?;
        self.check_address(&intent.destination_address)?;

        self.transition(intent, FlowState::Calculating).await?;
        let estimate = fees::estimate(intent.fee_rate, 1, 1, 0);
        log::debug!(
            "Intent {}: estimated {} sats total ({} fee + {} dust)",
            intent.id,
            estimate.total,
            estimate.tx_fee,
            estimate.dust_total
        );

        self.transition(intent, FlowState::OrderRequested).await?;
        let raw = self.order_client.create_order(intent).await?;
        self.ensure_current(intent).await?;

        self.transition(intent, FlowState::PsbtValidating).await?;
        let processed = psbt::process(
            &raw,
            &intent.source_address,
            self.network,
            intent.fee_rate,
            &ProcessOptions::default(),
        )?;

        self.transition(intent, FlowState::AwaitingSignature).await?;
        let provider = self.session.provider().await?;
        let signed = provider.sign_psbt(&processed.psbt_hex).await?;
        self.ensure_current(intent).await?;

        self.transition(intent, FlowState::Broadcasting).await?;
        let raw_txid = provider.push_psbt(&signed).await?;
        self.ensure_current(intent).await?;

        let txid = Txid::from_str(raw_txid.trim()).map_err(|e| {
            WalletError::Wallet(format!("extension returned malformed txid '{}': {}", raw_txid, e))
        })?;
        log::info!("Intent {} broadcast as {}", intent.id, txid);

        Ok(FlowOutcome {
            txid: txid.to_string(),
            estimate,
            processed,
        })
    }

    fn check_address(&self, address: &str) -> Result<(), WalletError> {
        Address::from_str(address)
            .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))?
            .require_network(self.network)
            .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))?;
        Ok(())
    }

    async fn transition(
        &self,
        intent: &TransactionIntent,
        state: FlowState,
    ) -> Result<(), WalletError> {
        self.ensure_current(intent).await?;
        log::debug!("Intent {}: -> {:?}", intent.id, state);
        self.state.send_replace(FlowSnapshot {
            intent_id: Some(intent.id),
            state,
        });
        Ok(())
    }

    async fn ensure_current(&self, intent: &TransactionIntent) -> Result<(), WalletError> {
        match *self.active.lock().await {
            Some(id) if id == intent.id => Ok(()),
            _ => {
                log::info!("Discarding response for superseded intent {}", intent.id);
                Err(WalletError::Superseded)
            }
        }
    }
}
