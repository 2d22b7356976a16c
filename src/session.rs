//! Wallet session lifecycle.
//!
//! One active session per process. Sessions are created on connect, rebuilt
//! from scratch on every account change and torn down on disconnect; a
//! session value is never patched in place, so no reader can observe a
//! half-updated address/key pair. Readers take immutable snapshots through
//! a watch channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::error::WalletError;
use crate::provider::{BtcBalance, WalletProvider};

#[derive(Debug, Clone, Serialize)]
pub struct WalletSession {
    pub address: String,
    pub public_key: String,
    pub balance: BtcBalance,
    pub network: String,
    pub provider: String,
    pub connected_at: DateTime<Utc>,
}

pub struct SessionManager {
    network: String,
    provider: Mutex<Option<Arc<dyn WalletProvider>>>,
    sender: watch::Sender<Option<Arc<WalletSession>>>,
    refresh: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    pub fn new(network: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            network: network.into(),
            provider: Mutex::new(None),
            sender,
            refresh: Mutex::new(None),
        }
    }

    /// Watch session snapshots; `None` means disconnected.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<WalletSession>>> {
        self.sender.subscribe()
    }

    /// Current snapshot, if connected.
    pub fn snapshot(&self) -> Option<Arc<WalletSession>> {
        self.sender.borrow().clone()
    }

    /// Connect through the given provider. The session is built completely
    /// before it becomes visible; a failure leaves no partial state.
    pub async fn connect(
        self: &Arc<Self>,
        provider: Arc<dyn WalletProvider>,
    ) -> Result<Arc<WalletSession>, WalletError> {
        let accounts = provider.connect().await?;
        let address = accounts
            .into_iter()
            .next()
            .ok_or_else(|| WalletError::Wallet("extension reported no accounts".to_string()))?;

        let session = self.build_session(&provider, address).await?;

        *self.provider.lock().await = Some(provider);
        self.sender.send_replace(Some(session.clone()));
        log::info!(
            "Wallet connected via {}: {}",
            session.provider,
            session.address
        );

        self.spawn_balance_refresh().await;
        Ok(session)
    }

    /// Account-change notification from the extension.
    ///
    /// Zero accounts tears the session down; any non-empty change rebuilds
    /// it wholesale with a fresh key and balance.
    pub async fn handle_accounts_changed(
        self: &Arc<Self>,
        accounts: Vec<String>,
    ) -> Result<(), WalletError> {
        let Some(address) = accounts.into_iter().next() else {
            self.disconnect().await;
            return Ok(());
        };

        let provider = {
            let guard = self.provider.lock().await;
            match guard.as_ref() {
                Some(provider) => provider.clone(),
                None => {
                    log::warn!("Account change with no active session, ignoring");
                    return Ok(());
                }
            }
        };

        let session = self.build_session(&provider, address).await?;
        self.sender.send_replace(Some(session.clone()));
        log::info!("Wallet session rebuilt for {}", session.address);

        self.spawn_balance_refresh().await;
        Ok(())
    }

    pub async fn disconnect(&self) {
        if let Some(task) = self.refresh.lock().await.take() {
            task.abort();
        }
        *self.provider.lock().await = None;
        self.sender.send_replace(None);
        log::info!("Wallet session torn down");
    }

    /// The provider backing the active session.
    pub async fn provider(&self) -> Result<Arc<dyn WalletProvider>, WalletError> {
        self.provider
            .lock()
            .await
            .clone()
            .ok_or_else(|| WalletError::Wallet("no wallet connected".to_string()))
    }

    async fn build_session(
        &self,
        provider: &Arc<dyn WalletProvider>,
        address: String,
    ) -> Result<Arc<WalletSession>, WalletError> {
        let public_key = provider.get_public_key().await?;
        let balance = provider.get_balance().await?;

        Ok(Arc::new(WalletSession {
            address,
            public_key,
            balance,
            network: self.network.clone(),
            provider: provider.name().to_string(),
            connected_at: Utc::now(),
        }))
    }

    /// Re-read the balance shortly after connect, as a scoped background
    /// task. Not part of the signing pipeline: errors are logged, never
    /// propagated, and the task dies with the session.
    async fn spawn_balance_refresh(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            manager.refresh_balance().await;
        });
        if let Some(previous) = self.refresh.lock().await.replace(handle) {
            previous.abort();
        }
    }

    async fn refresh_balance(&self) {
        let (provider, current) = {
            let guard = self.provider.lock().await;
            match (guard.as_ref(), self.snapshot()) {
                (Some(provider), Some(session)) => (provider.clone(), session),
                _ => return,
            }
        };

        match provider.get_balance().await {
            Ok(balance) if balance != current.balance => {
                let refreshed = Arc::new(WalletSession {
                    balance,
                    connected_at: Utc::now(),
                    ..(*current).clone()
                });
                self.sender.send_replace(Some(refreshed));
                log::debug!("Session balance refreshed");
            }
            Ok(_) => {}
            Err(e) => log::warn!("Background balance refresh failed: {}", e),
        }
    }
}
