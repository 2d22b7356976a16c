//! PSBT post-processing.
//!
//! Decodes the funding service's raw PSBT and validates it against the
//! requested fee rate and the dust rules before anything is signed. A PSBT
//! that fails here terminates the flow; values are never silently corrected.

use std::str::FromStr;

use bitcoin::{Address, Network, Psbt, TxOut};
use serde::Serialize;

use crate::error::WalletError;
use crate::fees::{self, FeeRate, DUST_LIMIT};
use crate::order::RawOrder;

/// Allowed deviation of the implied fee rate from the requested rate.
pub const FEE_TOLERANCE_PERCENT: u64 = 5;

#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    /// Require every consumed input to belong to the source address
    pub validate_inputs: bool,
    /// Require the implied fee rate to match the requested rate
    pub validate_fees: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            validate_inputs: true,
            validate_fees: true,
        }
    }
}

/// Validated, sign-ready PSBT plus its cost breakdown (satoshis).
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedPsbt {
    /// Normalized PSBT, base64
    pub psbt: String,
    /// Same PSBT as hex, the form extension signers accept
    pub psbt_hex: String,
    pub tx_fee: u64,
    pub mint_fee: u64,
    pub dust_total: u64,
    pub total: u64,
    pub estimated_vsize: u64,
}

/// Decode and validate a raw order PSBT.
///
/// Checks, in order: decodability, input attribution to `source_address`
/// (when `validate_inputs`), fee conservation, the dust floor on non-change
/// outputs, and the fee-rate tolerance band (when `validate_fees`).
pub fn process(
    raw: &RawOrder,
    source_address: &str,
    network: Network,
    rate: FeeRate,
    options: &ProcessOptions,
) -> Result<ProcessedPsbt, WalletError> {
    let psbt = Psbt::from_str(raw.psbt_base64.trim())
        .map_err(|e| WalletError::InvalidPsbt(format!("decode failed: {}", e)))?;

    let source = Address::from_str(source_address)
        .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", source_address, e)))?
        .require_network(network)
        .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", source_address, e)))?;
    let source_spk = source.script_pubkey();

    let tx = &psbt.unsigned_tx;

    let mut total_in = 0u64;
    for index in 0..tx.input.len() {
        let utxo = input_utxo(&psbt, index)?;
        if options.validate_inputs && utxo.script_pubkey != source_spk {
            return Err(WalletError::InvalidPsbt(format!(
                "input {} is not spendable by {}",
                index, source_address
            )));
        }
        total_in += utxo.value.to_sat();
    }

    let total_out: u64 = tx.output.iter().map(|o| o.value.to_sat()).sum();
    if total_out > total_in {
        return Err(WalletError::InvalidPsbt(format!(
            "outputs ({} sats) exceed inputs ({} sats)",
            total_out, total_in
        )));
    }
    let fee = total_in - total_out;

    // Dust/change split comes from the actual outputs, not from the
    // calculator's pre-order assumption. OP_RETURN data carriers are exempt
    // from the value floor.
    let mut dust_total = 0u64;
    for (vout, output) in tx.output.iter().enumerate() {
        if output.script_pubkey == source_spk || output.script_pubkey.is_op_return() {
            continue;
        }
        let value = output.value.to_sat();
        if value < DUST_LIMIT {
            return Err(WalletError::DustViolation {
                vout,
                value,
                limit: DUST_LIMIT,
            });
        }
        dust_total += value;
    }

    // The PSBT is unsigned, so witness sizes are unknown; both sides of the
    // comparison use the same input/output estimator.
    let vsize = fees::estimate_vsize(tx.input.len(), tx.output.len());
    if options.validate_fees {
        let requested = rate.fee_per_kvb();
        let actual = fee * 1000 / vsize;
        let tolerance = requested * FEE_TOLERANCE_PERCENT / 100;
        if actual.abs_diff(requested) > tolerance {
            return Err(WalletError::FeeMismatch { requested, actual });
        }
    }

    log::debug!(
        "PSBT validated: fee {} sats over ~{} vB, dust {} sats across {} outputs",
        fee,
        vsize,
        dust_total,
        tx.output.len()
    );

    let bytes = psbt.serialize();
    Ok(ProcessedPsbt {
        psbt: psbt.to_string(),
        psbt_hex: hex::encode(bytes),
        tx_fee: fee,
        mint_fee: 0,
        dust_total,
        total: fee + dust_total,
        estimated_vsize: vsize,
    })
}

/// The UTXO an input spends, from its witness or non-witness metadata.
fn input_utxo(psbt: &Psbt, index: usize) -> Result<&TxOut, WalletError> {
    let input = psbt
        .inputs
        .get(index)
        .ok_or_else(|| WalletError::InvalidPsbt(format!("input {} missing metadata", index)))?;

    if let Some(ref utxo) = input.witness_utxo {
        return Ok(utxo);
    }
    if let Some(ref prev_tx) = input.non_witness_utxo {
        let vout = psbt
            .unsigned_tx
            .input
            .get(index)
            .map(|txin| txin.previous_output.vout as usize)
            .ok_or_else(|| {
                WalletError::InvalidPsbt(format!("input {} missing from unsigned tx", index))
            })?;
        return prev_tx.output.get(vout).ok_or_else(|| {
            WalletError::InvalidPsbt(format!("input {} references a missing prevout", index))
        });
    }

    Err(WalletError::InvalidPsbt(format!(
        "input {} carries no spendable value",
        index
    )))
}
