//! Withdrawal fee calculation
//!
//! Fee rates use 10^6 precision: 25_000 = 2.5%

use serde::{Deserialize, Serialize};

/// Fee rate precision (10^6 = 1,000,000)
pub const FEE_RATE_PRECISION: u64 = 1_000_000;

/// Default percentage rate (25_000 = 2.5%)
pub const DEFAULT_RATE_PPM: u64 = 25_000;

/// Default fixed fee per withdrawal (Rp 2.500)
pub const DEFAULT_FIXED_FEE: u64 = 2_500;

/// Default minimum withdrawal amount (Rp 50.000)
pub const DEFAULT_MINIMUM_WITHDRAWAL: u64 = 50_000;

/// Platform withdrawal fee policy, loaded from config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Percentage component in 10^6 precision (25_000 = 2.5%)
    pub rate_ppm: u64,
    /// Flat component added to every withdrawal, in whole rupiah
    pub fixed_fee: u64,
    /// Smallest gross amount a creator may request
    pub minimum_withdrawal: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            rate_ppm: DEFAULT_RATE_PPM,
            fixed_fee: DEFAULT_FIXED_FEE,
            minimum_withdrawal: DEFAULT_MINIMUM_WITHDRAWAL,
        }
    }
}

/// Fee split of one gross withdrawal amount.
///
/// Invariant: `net + fee == gross` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub gross: u64,
    pub fee: u64,
    pub net: u64,
}

impl FeePolicy {
    /// Compute the fee for a gross amount.
    ///
    /// Percentage component is rounded half-up to the whole rupiah;
    /// u128 intermediate prevents overflow.
    #[inline]
    pub fn fee(&self, gross: u64) -> u64 {
        let pct = (gross as u128 * self.rate_ppm as u128 + FEE_RATE_PRECISION as u128 / 2)
            / FEE_RATE_PRECISION as u128;
        pct as u64 + self.fixed_fee
    }

    /// Split a gross amount into fee and net payout.
    ///
    /// Returns `None` when the fee consumes the whole amount; callers
    /// reject such requests before a record is created.
    pub fn split(&self, gross: u64) -> Option<FeeBreakdown> {
        let fee = self.fee(gross);
        let net = gross.checked_sub(fee)?;
        if net == 0 {
            return None;
        }
        Some(FeeBreakdown { gross, fee, net })
    }
}
