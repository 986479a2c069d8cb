//! # Deposit Normalization
//!
//! Wrapped-stablecoin transfers reach the bridge as message deposits whose
//! destination is the relay contract on the other side. The real recipient
//! and amount travel in the message metadata, ABI encoded as
//! `(address recipient, uint256 amount)`.

use super::token_registry::TokenRegistry;
use crate::domain::{Address, Deposit, LeafType};
use crate::error::{SyncError, SyncResult};
use primitive_types::U256;

const WORD: usize = 32;

/// Recipient and amount carried by a wrapped-stablecoin message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BridgeMetadata {
    pub recipient: Address,
    pub amount: U256,
}

/// Decode the two-word metadata of a wrapped-stablecoin message.
///
/// The recipient is the low 20 bytes of the first word; padding is not
/// checked.
pub fn decode_bridge_metadata(metadata: &[u8]) -> SyncResult<BridgeMetadata> {
    if metadata.len() < 2 * WORD {
        return Err(SyncError::MetadataDecode {
            reason: format!("expected at least {} bytes, got {}", 2 * WORD, metadata.len()),
        });
    }
    let (address_word, rest) = metadata.split_at(WORD);
    let mut recipient = [0u8; 20];
    recipient.copy_from_slice(&address_word[WORD - 20..]);

    Ok(BridgeMetadata {
        recipient: Address(recipient),
        amount: U256::from_big_endian(&rest[..WORD]),
    })
}

/// Rewrite a wrapped-stablecoin message deposit so `destination_address` is
/// the end user. The relay contract moves to `dest_contract_address`.
///
/// Never fails: undecodable metadata leaves the zero address as destination.
pub fn normalize_deposit(deposit: &mut Deposit, registry: &TokenRegistry) {
    if deposit.leaf_type != LeafType::Message || !registry.is_usdc_contract(&deposit.origin_address)
    {
        return;
    }
    deposit.dest_contract_address = deposit.destination_address;
    deposit.destination_address = match decode_bridge_metadata(&deposit.metadata) {
        Ok(meta) => meta.recipient,
        Err(e) => {
            tracing::debug!(
                tx_hash = %deposit.tx_hash,
                error = %e,
                "[bridge-sync] metadata decode failed"
            );
            Address::ZERO
        }
    };
}

/// Display-oriented rewrite of a wrapped-stablecoin message: report the
/// wrapped token and the amount from the metadata instead of the relay
/// contract and the zero message value.
///
/// With `as_asset` the leaf type becomes [`LeafType::Asset`] as well.
pub fn replace_stablecoin_deposit_info(
    deposit: &mut Deposit,
    registry: &TokenRegistry,
    as_asset: bool,
) {
    if deposit.leaf_type != LeafType::Message {
        return;
    }
    let Some(token) = registry.usdc_token_for(&deposit.origin_address) else {
        return;
    };
    deposit.origin_address = token;
    if let Ok(meta) = decode_bridge_metadata(&deposit.metadata) {
        deposit.amount = meta.amount;
    }
    if as_asset {
        deposit.leaf_type = LeafType::Asset;
    }
}

/// ABI-encode `(recipient, amount)` the way the relay contract does.
pub fn encode_bridge_metadata(recipient: &Address, amount: U256) -> Vec<u8> {
    let mut out = vec![0u8; 2 * WORD];
    out[WORD - 20..WORD].copy_from_slice(recipient.as_bytes());
    amount.to_big_endian(&mut out[WORD..]);
    out
}
