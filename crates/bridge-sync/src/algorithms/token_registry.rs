//! # Token Registry
//!
//! Lookup table built from [`BusinessConfig`]: USDC bridge wrapper contracts
//! paired with the token they wrap.

use crate::config::BusinessConfig;
use crate::domain::Address;
use crate::error::{SyncError, SyncResult};
use std::collections::HashMap;

/// Immutable registry, cheap to share behind an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct TokenRegistry {
    usdc: HashMap<Address, Address>,
}

impl TokenRegistry {
    /// Build the registry, rejecting contract/token lists of unequal length.
    pub fn from_config(config: &BusinessConfig) -> SyncResult<Self> {
        let contracts = &config.usdc_contract_addresses;
        let tokens = &config.usdc_token_addresses;
        if contracts.len() != tokens.len() {
            return Err(SyncError::Config {
                reason: format!(
                    "{} USDC contract addresses but {} token addresses",
                    contracts.len(),
                    tokens.len()
                ),
            });
        }

        Ok(Self {
            usdc: contracts.iter().copied().zip(tokens.iter().copied()).collect(),
        })
    }

    /// Whether `address` is a USDC bridge wrapper contract.
    pub fn is_usdc_contract(&self, address: &Address) -> bool {
        self.usdc.contains_key(address)
    }

    /// USDC token wrapped by `contract`.
    pub fn usdc_token_for(&self, contract: &Address) -> Option<Address> {
        self.usdc.get(contract).copied()
    }
}
