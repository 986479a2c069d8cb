//! # Algorithms Module
//!
//! Pure functions: global index codec, deposit normalization, token registry
//! lookups and transfer valuation.

pub mod global_index;
pub mod normalizer;
pub mod token_registry;
pub mod valuation;

pub use normalizer::{
    decode_bridge_metadata, encode_bridge_metadata, normalize_deposit,
    replace_stablecoin_deposit_info, BridgeMetadata,
};
pub use token_registry::TokenRegistry;
pub use valuation::{expired_large_tx_key, large_tx_key, token_amount, u256_to_f64, usd_value};
