//! Error types for the bridge synchronizer.

use crate::domain::NetworkId;
use thiserror::Error;

/// Synchronizer errors.
///
/// Only [`SyncError::SideStore`], [`SyncError::Rollback`] and
/// [`SyncError::PrimaryStore`] ever reach the caller of the synchronizer;
/// everything else is logged by the task that produced it.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Side-store (cache) operation failed
    #[error("Side store error: {reason}")]
    SideStore { reason: String },

    /// Primary-store operation failed
    #[error("Primary store error: {reason}")]
    PrimaryStore { reason: String },

    /// Rolling back the primary-store transaction failed
    #[error("Rollback failed: {reason}")]
    Rollback { reason: String },

    /// Deposit referenced by a claim is unknown
    #[error("Deposit not found: index {deposit_count} on network {network_id}")]
    DepositNotFound {
        deposit_count: u32,
        network_id: NetworkId,
    },

    /// Claim fields do not identify a deposit network
    #[error("Invalid claim {index}: {reason}")]
    InvalidClaim { index: u32, reason: String },

    /// Broker rejected or failed to deliver a message
    #[error("Broker error: {reason}")]
    Broker { reason: String },

    /// Outbound payload could not be encoded
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Bridge metadata could not be decoded
    #[error("Metadata decode error: {reason}")]
    MetadataDecode { reason: String },

    /// Value is not a valid global index
    #[error("Invalid global index: {0}")]
    InvalidGlobalIndex(String),

    /// Leaf type code not known to this synchronizer
    #[error("Unknown leaf type: {0}")]
    UnknownLeafType(u8),

    /// Chain client call failed
    #[error("Chain client error: {reason}")]
    ChainClient { reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// Background task panicked
    #[error("Task panicked: {reason}")]
    Panicked { reason: String },

    /// Task cancelled by shutdown
    #[error("Cancelled")]
    Cancelled,
}

/// Result type for synchronizer operations
pub type SyncResult<T> = Result<T, SyncError>;
