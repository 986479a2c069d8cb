//! # Outbound DTOs
//!
//! Transfer-status notifications, token metadata, price quotes and large
//! transfer records. Notifications serialize to the camelCase JSON consumers
//! already decode.

use super::value_objects::{Address, ChainId, NetworkId};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Token display metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// Logo URL.
    pub logo_url: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Token decimals.
    #[serde(rename = "decimal")]
    pub decimals: u32,
}

/// Lookup key for token metadata: token address on a given chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenKey {
    /// Token address as rendered in notifications.
    pub address: String,
    /// EVM chain id.
    pub chain_id: ChainId,
}

impl TokenKey {
    /// Build a key, normalizing the address to lowercase.
    pub fn new(address: &str, chain_id: ChainId) -> Self {
        Self {
            address: address.to_lowercase(),
            chain_id,
        }
    }

    /// String form used by caches (`"<address>_<chain id>"`).
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.address, self.chain_id)
    }
}

/// Transfer-status message pushed to the broker.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferNotification {
    /// Network the deposit was emitted on.
    pub from_chain: NetworkId,
    /// Destination network.
    pub to_chain: NetworkId,
    /// Token address (origin network).
    pub bridge_token: String,
    /// Raw amount, decimal string.
    pub token_amount: String,
    /// Estimated minutes until the transfer can be claimed.
    pub estimate_time: u32,
    /// Deposit time, unix milliseconds.
    pub time: u64,
    /// Deposit transaction.
    pub tx_hash: String,
    /// Persistence id of the deposit.
    pub id: u64,
    /// Deposit count.
    pub index: u64,
    /// [`super::TransferStatus`] code.
    pub status: u32,
    /// Deposit block number.
    pub block_number: u64,
    /// Effective recipient.
    pub dest_addr: String,
    /// EVM chain id of `from_chain`.
    pub from_chain_id: ChainId,
    /// EVM chain id of `to_chain`.
    pub to_chain_id: ChainId,
    /// Global index, decimal string.
    pub global_index: String,
    /// Leaf type code.
    pub leaf_type: u32,
    /// Network the token originates from.
    pub original_network: NetworkId,
    /// Claim transaction, set on `Claimed`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub claim_tx_hash: String,
    /// Claim time in unix milliseconds, set on `Claimed`.
    #[serde(skip_serializing_if = "is_zero")]
    pub claim_time: u64,
    /// Token metadata filled in by the enricher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_info: Option<TokenInfo>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Token identity for a price lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    /// EVM chain id.
    pub chain_id: ChainId,
    /// Token address.
    pub address: String,
}

/// Reference USD price for a token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInfo {
    /// EVM chain id.
    pub chain_id: ChainId,
    /// Token address.
    pub address: String,
    /// Ticker symbol.
    pub symbol: String,
    /// USD price per whole token.
    pub price: f64,
}

/// Transfer above the configured USD threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargeTransferRecord {
    /// EVM chain id of the token's origin network.
    pub chain_id: ChainId,
    /// Ticker symbol.
    pub symbol: String,
    /// Amount in whole tokens.
    pub amount: f64,
    /// USD value.
    pub usd_amount: f64,
    /// Deposit transaction.
    pub hash: String,
    /// Recipient.
    pub address: String,
}

/// Per-deposit metric sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderMetric {
    /// Network the deposit was emitted on.
    pub from_network: NetworkId,
    /// Destination network.
    pub to_network: NetworkId,
    /// Leaf type code.
    pub leaf_type: u8,
    /// Token origin network.
    pub origin_network: NetworkId,
    /// Token address.
    pub token: Address,
    /// Raw amount.
    pub amount: U256,
}
