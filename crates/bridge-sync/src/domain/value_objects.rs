//! # Domain Value Objects
//!
//! Identifiers and enumerations shared by deposits, claims and notifications.

use crate::error::SyncError;
use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Bridge network identifier (0 is the L1 mainnet, rollups start at 1).
pub type NetworkId = u32;

/// EVM chain id.
pub type ChainId = u64;

/// Network id of the L1 mainnet.
pub const MAINNET_NETWORK_ID: NetworkId = 0;

fn parse_hex_bytes<const N: usize>(s: &str) -> Result<[u8; N], SyncError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(trimmed).map_err(|e| SyncError::Config {
        reason: format!("invalid hex {s}: {e}"),
    })?;
    bytes.try_into().map_err(|b: Vec<u8>| SyncError::Config {
        reason: format!("expected {N} bytes, got {}", b.len()),
    })
}

macro_rules! hex_newtype {
    ($name:ident, $len:expr) => {
        impl $name {
            /// All-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// `true` for the all-zero value.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl FromStr for $name {
            type Err = SyncError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex_bytes::<$len>(s).map(Self)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// 20-byte account or contract address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

/// 32-byte transaction hash.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

hex_newtype!(Address, 20);
hex_newtype!(TxHash, 32);

/// Category of a bridge leaf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LeafType {
    /// Plain token or ether transfer.
    #[default]
    Asset = 0,
    /// Arbitrary message with metadata payload.
    Message = 1,
}

impl LeafType {
    /// Numeric value carried on chain and in notifications.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for LeafType {
    type Error = SyncError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Asset),
            1 => Ok(Self::Message),
            other => Err(SyncError::UnknownLeafType(other)),
        }
    }
}

/// Transfer status pushed to consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum TransferStatus {
    /// Deposit observed on the origin network.
    Created = 0,
    /// Deposit ready to be claimed on the destination network.
    Ready = 1,
    /// Deposit claimed on the destination network.
    Claimed = 2,
}

impl TransferStatus {
    /// Wire code.
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Cross-chain unique transfer identifier.
///
/// Layout (see [`crate::algorithms::global_index`]): bit 64 is the mainnet
/// flag, bits 32..64 the rollup index, bits 0..32 the deposit count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalIndex(pub U256);

impl fmt::Display for GlobalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GlobalIndex {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_dec_str(s)
            .map(Self)
            .map_err(|_| SyncError::InvalidGlobalIndex(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display_roundtrip() {
        let addr: Address = "0x00000000000000000000000000000000000000aB".parse().unwrap();
        assert_eq!(addr.to_string(), "0x00000000000000000000000000000000000000ab");
        assert_eq!(addr.to_string().parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_address_wrong_length_rejected() {
        assert!("0x1234".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_serde_as_string() {
        let addr = Address([0x11; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "11".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_leaf_type_conversion() {
        assert_eq!(LeafType::try_from(0).unwrap(), LeafType::Asset);
        assert_eq!(LeafType::try_from(1).unwrap(), LeafType::Message);
        assert!(matches!(
            LeafType::try_from(7),
            Err(SyncError::UnknownLeafType(7))
        ));
    }

    #[test]
    fn test_transfer_status_codes() {
        assert_eq!(TransferStatus::Created.code(), 0);
        assert_eq!(TransferStatus::Claimed.code(), 2);
    }
}
