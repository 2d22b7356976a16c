/// Shared test infrastructure for pipeline integration tests
///
/// Provides:
/// - An in-process mock of the funding/order service on an ephemeral port
/// - A scripted wallet provider standing in for a signing extension
/// - PSBT fixtures shaped like real orders (dust output + change)
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::State, routing::post, Json, Router};
use bitcoin::absolute::LockTime;
use bitcoin::transaction::Version;
use bitcoin::{
    Address, Amount, Network, OutPoint, Psbt, ScriptBuf, Sequence, Transaction, TxIn, TxOut,
    Witness,
};
use serde_json::Value;

use stamp_wallet::error::WalletError;
use stamp_wallet::provider::{BtcBalance, WalletProvider};

/// BIP-173 mainnet test vectors
pub const SOURCE: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
pub const DEST: &str = "bc1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3qccfmv3";

pub const TXID: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

pub fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

struct MockOrder {
    response: Value,
    delay: Duration,
}

async fn create_handler(State(state): State<Arc<MockOrder>>) -> Json<Value> {
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    Json(state.response.clone())
}

/// Serve a canned order response on an ephemeral port; returns the base URL.
pub async fn spawn_order_service(response: Value, delay: Duration) -> String {
    let state = Arc::new(MockOrder { response, delay });
    let app = Router::new()
        .route("/create", post(create_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn script_for(address: &str) -> ScriptBuf {
    Address::from_str(address)
        .unwrap()
        .require_network(Network::Bitcoin)
        .unwrap()
        .script_pubkey()
}

/// Unsigned order PSBT: one source input, a dust output to the destination
/// and change back to the source.
pub fn order_psbt_base64(input_value: u64, dust_value: u64, fee: u64) -> String {
    let change = input_value - dust_value - fee;
    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![
            TxOut {
                value: Amount::from_sat(dust_value),
                script_pubkey: script_for(DEST),
            },
            TxOut {
                value: Amount::from_sat(change),
                script_pubkey: script_for(SOURCE),
            },
        ],
    };

    let mut psbt = Psbt::from_unsigned_tx(tx).unwrap();
    psbt.inputs[0].witness_utxo = Some(TxOut {
        value: Amount::from_sat(input_value),
        script_pubkey: script_for(SOURCE),
    });

    psbt.to_string()
}

/// Order response carrying a PSBT whose implied rate is exactly 78.0 sat/vB
/// (1 input, 2 outputs, 146 vB estimate).
pub fn good_order_response() -> Value {
    serde_json::json!({ "result": { "psbt": order_psbt_base64(100_000, 546, 11_388) } })
}

/// Scripted signing extension.
pub struct MockProvider {
    pub accounts: Vec<String>,
    pub public_key: String,
    pub balance: BtcBalance,
    pub txid: String,
    pub decline_signature: bool,
    pub sign_delay: Duration,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            accounts: vec![SOURCE.to_string()],
            public_key: "02166b147542d51052b25cbcf9c74d5a22bbd3a271e3bf5e46341f24848ef25089"
                .to_string(),
            balance: BtcBalance {
                confirmed: 150_000,
                unconfirmed: 0,
                total: 150_000,
            },
            txid: TXID.to_string(),
            decline_signature: false,
            sign_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn connect(&self) -> Result<Vec<String>, WalletError> {
        Ok(self.accounts.clone())
    }

    async fn get_public_key(&self) -> Result<String, WalletError> {
        Ok(self.public_key.clone())
    }

    async fn get_balance(&self) -> Result<BtcBalance, WalletError> {
        Ok(self.balance)
    }

    async fn sign_message(&self, _message: &str) -> Result<String, WalletError> {
        Ok("mock-signature".to_string())
    }

    async fn sign_psbt(&self, psbt_hex: &str) -> Result<String, WalletError> {
        if !self.sign_delay.is_zero() {
            tokio::time::sleep(self.sign_delay).await;
        }
        if self.decline_signature {
            return Err(WalletError::Wallet("user rejected the request".to_string()));
        }
        Ok(psbt_hex.to_string())
    }

    async fn push_tx(&self, _raw_tx_hex: &str) -> Result<String, WalletError> {
        Ok(self.txid.clone())
    }

    async fn push_psbt(&self, _psbt_hex: &str) -> Result<String, WalletError> {
        Ok(self.txid.clone())
    }
}
