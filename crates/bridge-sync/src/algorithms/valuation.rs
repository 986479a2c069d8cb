//! # Transfer Valuation
//!
//! USD valuation of raw token amounts and the day-bucketed keys large
//! transfers are cached under.

use crate::domain::NetworkId;
use chrono::{Days, NaiveDate};
use primitive_types::U256;

/// Lossy conversion of a U256 into an f64.
pub fn u256_to_f64(value: U256) -> f64 {
    const LIMB: f64 = 18_446_744_073_709_551_616.0; // 2^64
    value
        .0
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * LIMB + *limb as f64)
}

/// Whole-token amount of a raw decimal amount string.
///
/// Returns `None` when the string is not an unsigned decimal integer or
/// `decimals` exceeds `i32::MAX`.
pub fn token_amount(raw_amount: &str, decimals: u32) -> Option<f64> {
    let raw = U256::from_dec_str(raw_amount.trim()).ok()?;
    let exponent = i32::try_from(decimals).ok()?;
    Some(u256_to_f64(raw) / 10f64.powi(exponent))
}

/// USD value of a whole-token amount.
pub fn usd_value(price: f64, token_amount: f64) -> f64 {
    price * token_amount
}

/// Cache key of the large-transfer bucket for `chain` on `day`.
pub fn large_tx_key(chain: NetworkId, day: NaiveDate) -> String {
    format!("{}:{}", chain, day.format("%Y%m%d"))
}

/// Key of the bucket that falls out of the retention window on `today`.
pub fn expired_large_tx_key(chain: NetworkId, today: NaiveDate, retention_days: u32) -> String {
    let expired = today
        .checked_sub_days(Days::new(u64::from(retention_days)))
        .unwrap_or(NaiveDate::MIN);
    large_tx_key(chain, expired)
}
