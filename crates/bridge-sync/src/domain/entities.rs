//! # Domain Entities
//!
//! Decoded bridge events as handed over by the chain-event decoding layer.

use super::value_objects::{Address, LeafType, NetworkId, TxHash, MAINNET_NETWORK_ID};
use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, Utc};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// A transfer-out event recorded on a source network, pending claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// Asset or message.
    pub leaf_type: LeafType,
    /// Network the bridged token originates from.
    pub origin_network: NetworkId,
    /// Token address on its origin network (zero for ether).
    pub origin_address: Address,
    /// Raw amount in the token's smallest unit.
    pub amount: U256,
    /// Network the transfer is bound for.
    pub destination_network: NetworkId,
    /// Effective recipient once normalized. Before normalization a relay
    /// contract for wrapped-stablecoin messages.
    pub destination_address: Address,
    /// Relay contract of a normalized message deposit, zero otherwise.
    pub dest_contract_address: Address,
    /// Per-network deposit sequence number.
    pub deposit_count: u32,
    /// Persistence id of the block the deposit was found in.
    pub block_id: u64,
    /// Block number on the emitting network.
    pub block_number: u64,
    /// Network the deposit was emitted on.
    pub network_id: NetworkId,
    /// Emitting transaction.
    pub tx_hash: TxHash,
    /// Block timestamp.
    pub time: DateTime<Utc>,
    /// Raw metadata bytes.
    #[serde(with = "hex_bytes")]
    pub metadata: Vec<u8>,
    /// Whether the exit root covering this deposit is already settled.
    pub ready_for_claim: bool,
}

impl Deposit {
    /// `true` when emitted on the L1 mainnet.
    pub fn is_mainnet(&self) -> bool {
        self.network_id == MAINNET_NETWORK_ID
    }
}

impl Default for Deposit {
    fn default() -> Self {
        Self {
            leaf_type: LeafType::Asset,
            origin_network: 0,
            origin_address: Address::ZERO,
            amount: U256::zero(),
            destination_network: 0,
            destination_address: Address::ZERO,
            dest_contract_address: Address::ZERO,
            deposit_count: 0,
            block_id: 0,
            block_number: 0,
            network_id: 0,
            tx_hash: TxHash::ZERO,
            time: DateTime::<Utc>::default(),
            metadata: Vec::new(),
            ready_for_claim: false,
        }
    }
}

/// The event finalizing a deposit on its destination network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Deposit count of the referenced deposit.
    pub index: u32,
    /// Set when the referenced deposit originates on the L1 mainnet.
    pub mainnet_flag: bool,
    /// Rollup index of the referenced deposit when not mainnet.
    pub rollup_index: u32,
    /// Network the claimed token originates from.
    pub origin_network: NetworkId,
    /// Token address on its origin network.
    pub origin_address: Address,
    /// Recipient.
    pub destination_address: Address,
    /// Raw amount.
    pub amount: U256,
    /// Network the claim was executed on.
    pub network_id: NetworkId,
    /// Persistence id of the block the claim was found in.
    pub block_id: u64,
    /// Claim transaction.
    pub tx_hash: TxHash,
    /// Claim block timestamp.
    pub time: DateTime<Utc>,
}

impl Claim {
    /// Network the referenced deposit was emitted on.
    ///
    /// Fails when the rollup index has no network id (`u32::MAX`).
    pub fn deposit_network(&self) -> SyncResult<NetworkId> {
        if self.mainnet_flag {
            return Ok(MAINNET_NETWORK_ID);
        }
        self.rollup_index
            .checked_add(1)
            .ok_or_else(|| SyncError::InvalidClaim {
                index: self.index,
                reason: format!("rollup index {} out of range", self.rollup_index),
            })
    }
}

impl Default for Claim {
    fn default() -> Self {
        Self {
            index: 0,
            mainnet_flag: false,
            rollup_index: 0,
            origin_network: 0,
            origin_address: Address::ZERO,
            destination_address: Address::ZERO,
            amount: U256::zero(),
            network_id: 0,
            block_id: 0,
            tx_hash: TxHash::ZERO,
            time: DateTime::<Utc>::default(),
        }
    }
}

/// Chain head as returned by a chain client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainHeader {
    /// Block number.
    pub number: u64,
    /// Block hash.
    pub hash: TxHash,
    /// Block timestamp (unix seconds).
    pub timestamp: u64,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
    }
}
