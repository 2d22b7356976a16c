//! Fee and amount calculation for token transactions.
//!
//! Pure integer arithmetic in satoshis: the same inputs always produce the
//! same breakdown. Nothing here touches the network.

use serde::Serialize;

use crate::error::WalletError;

/// Network dust floor per non-change output, in satoshis.
pub const DUST_LIMIT: u64 = 546;

/// Bounds of the raw fee-rate control value, in tenths of sat/vB.
pub const FEE_CONTROL_MIN: u64 = 88;
pub const FEE_CONTROL_MAX: u64 = 2640;

/// Fee rate held as the raw control value: tenths of sat/vB.
///
/// A control value of 780 is an effective rate of 78.0 sat/vB. Construction
/// validates the range, so a `FeeRate` in hand is always usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeeRate(u64);

impl FeeRate {
    /// Build from the raw control value (tenths of sat/vB, 88..=2640).
    pub fn from_control(value: i64) -> Result<Self, WalletError> {
        if value <= 0 {
            return Err(WalletError::InvalidFeeRate(format!(
                "fee rate must be positive, got {}",
                value
            )));
        }
        let value = value as u64;
        if !(FEE_CONTROL_MIN..=FEE_CONTROL_MAX).contains(&value) {
            return Err(WalletError::InvalidFeeRate(format!(
                "control value {} outside {}..={}",
                value, FEE_CONTROL_MIN, FEE_CONTROL_MAX
            )));
        }
        Ok(Self(value))
    }

    /// Build from a fee expressed in sat per 1000 virtual bytes, the unit
    /// the funding service speaks.
    pub fn from_fee_per_kvb(fee_per_kvb: i64) -> Result<Self, WalletError> {
        if fee_per_kvb <= 0 {
            return Err(WalletError::InvalidFeeRate(format!(
                "fee_per_kb must be positive, got {}",
                fee_per_kvb
            )));
        }
        Self::from_control(fee_per_kvb / 100)
    }

    /// Raw control value: tenths of sat/vB.
    pub fn control(&self) -> u64 {
        self.0
    }

    /// Rate in sat per 1000 virtual bytes.
    pub fn fee_per_kvb(&self) -> u64 {
        self.0 * 100
    }

    /// Effective rate in sat/vB, for display.
    pub fn sat_per_vb(&self) -> f64 {
        self.0 as f64 / 10.0
    }

    /// Fee in satoshis for a transaction of `vsize` virtual bytes.
    ///
    /// Truncating division of the tenths value: at most one satoshi below
    /// the exact product.
    pub fn fee_for_vsize(&self, vsize: u64) -> u64 {
        vsize * self.0 / 10
    }
}

/// Cost breakdown for one intent, all values in satoshis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeEstimate {
    pub tx_fee: u64,
    pub mint_fee: u64,
    pub dust_total: u64,
    pub total: u64,
}

/// Estimate transaction virtual size from input and output counts.
pub fn estimate_vsize(num_inputs: usize, num_outputs: usize) -> u64 {
    let base_size = 10;
    let input_size = 68;
    let output_size = 34;

    (base_size + (num_inputs * input_size) + (num_outputs * output_size)) as u64
}

/// Estimate the cost of an order: `dust_outputs` token-carrying outputs plus
/// one change output back to the source.
pub fn estimate(
    rate: FeeRate,
    num_inputs: usize,
    dust_outputs: usize,
    mint_fee: u64,
) -> FeeEstimate {
    let vsize = estimate_vsize(num_inputs, dust_outputs + 1);
    let tx_fee = rate.fee_for_vsize(vsize);
    let dust_total = dust_outputs as u64 * DUST_LIMIT;

    FeeEstimate {
        tx_fee,
        mint_fee,
        dust_total,
        total: tx_fee + mint_fee + dust_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_rates() {
        assert!(FeeRate::from_control(0).is_err());
        assert!(FeeRate::from_control(-780).is_err());
        assert!(FeeRate::from_fee_per_kvb(0).is_err());
        assert!(FeeRate::from_fee_per_kvb(-1).is_err());
    }

    #[test]
    fn rejects_out_of_range_control_values() {
        assert!(FeeRate::from_control(87).is_err());
        assert!(FeeRate::from_control(2641).is_err());
        assert!(FeeRate::from_control(88).is_ok());
        assert!(FeeRate::from_control(2640).is_ok());
    }

    #[test]
    fn unit_conversions() {
        let rate = FeeRate::from_control(780).unwrap();
        assert_eq!(rate.control(), 780);
        assert_eq!(rate.fee_per_kvb(), 78_000);
        assert!((rate.sat_per_vb() - 78.0).abs() < f64::EPSILON);
    }

    #[test]
    fn estimate_is_pure() {
        let rate = FeeRate::from_control(780).unwrap();
        let first = estimate(rate, 1, 1, 0);
        let second = estimate(rate, 1, 1, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn total_is_sum_of_parts() {
        for control in [88, 780, 999, 2640] {
            let rate = FeeRate::from_control(control).unwrap();
            let breakdown = estimate(rate, 2, 3, 1000);
            assert_eq!(
                breakdown.total,
                breakdown.tx_fee + breakdown.mint_fee + breakdown.dust_total
            );
        }
    }

    #[test]
    fn fee_rounding_drift_is_at_most_one_sat() {
        // 89 tenths over 146 vB: exact fee is 1299.4 sats.
        let rate = FeeRate::from_control(89).unwrap();
        let fee = rate.fee_for_vsize(146);
        let exact = 146.0 * 8.9;
        assert!((exact - fee as f64) < 1.0);
    }

    #[test]
    fn single_dust_output_costs_one_dust_unit() {
        let rate = FeeRate::from_control(780).unwrap();
        let breakdown = estimate(rate, 1, 1, 0);
        assert_eq!(breakdown.dust_total, DUST_LIMIT);
    }
}
