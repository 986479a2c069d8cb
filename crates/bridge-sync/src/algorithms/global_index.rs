//! # Global Index Codec
//!
//! ```text
//!  bit 64          bits 32..64        bits 0..32
//! [mainnet] [   rollup index   ] [  deposit count  ]
//! ```
//!
//! Contracts on both sides of the bridge decode the same integer, so the
//! widths are fixed.

use crate::domain::GlobalIndex;
use crate::error::{SyncError, SyncResult};
use primitive_types::U256;

/// Bit position of the mainnet flag.
pub const MAINNET_FLAG_BIT: usize = 64;

const ROLLUP_INDEX_SHIFT: usize = 32;

/// Encode a transfer identity into its global index.
pub fn encode(is_mainnet: bool, rollup_index: u32, deposit_count: u32) -> GlobalIndex {
    let mut value = (U256::from(rollup_index) << ROLLUP_INDEX_SHIFT) | U256::from(deposit_count);
    if is_mainnet {
        value = value | (U256::one() << MAINNET_FLAG_BIT);
    }
    GlobalIndex(value)
}

/// Decode a global index into `(is_mainnet, rollup_index, deposit_count)`.
///
/// Fails when any bit above the mainnet flag is set.
pub fn decode(index: GlobalIndex) -> SyncResult<(bool, u32, u32)> {
    let value = index.0;
    if value >> (MAINNET_FLAG_BIT + 1) != U256::zero() {
        return Err(SyncError::InvalidGlobalIndex(value.to_string()));
    }
    let is_mainnet = value.bit(MAINNET_FLAG_BIT);
    let rollup_index = ((value >> ROLLUP_INDEX_SHIFT).low_u64() & u64::from(u32::MAX)) as u32;
    let deposit_count = (value.low_u64() & u64::from(u32::MAX)) as u32;
    Ok((is_mainnet, rollup_index, deposit_count))
}
