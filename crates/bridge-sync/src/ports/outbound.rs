//! # Outbound Ports
//!
//! Collaborators the synchronizer drives: the primary ledger, the side-store
//! cache, the message broker, finality estimation, token metadata, metrics and
//! the chain client.

use crate::domain::{
    ChainHeader, Claim, Deposit, LargeTransferRecord, NetworkId, OrderMetric, PriceInfo,
    SymbolInfo, TokenInfo, TokenKey, TransferNotification,
};
use crate::error::SyncResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Transactional bridge ledger.
///
/// The transaction handle belongs to the calling synchronization loop; the
/// synchronizer only borrows it.
#[async_trait]
pub trait PrimaryStore: Send + Sync + 'static {
    /// Open transaction handle.
    type Tx: Send;

    /// Persist a deposit inside `tx`, returning its id.
    async fn add_deposit(&self, deposit: &Deposit, tx: &mut Self::Tx) -> SyncResult<u64>;

    /// Persist a claim inside `tx`.
    async fn add_claim(&self, claim: &Claim, tx: &mut Self::Tx) -> SyncResult<()>;

    /// Deposit with the given count emitted on `network_id`.
    async fn get_deposit(
        &self,
        deposit_count: u32,
        network_id: NetworkId,
        tx: Option<&mut Self::Tx>,
    ) -> SyncResult<Deposit>;

    /// Roll back `tx`.
    async fn rollback(&self, tx: &mut Self::Tx) -> SyncResult<()>;
}

/// Fast key-value cache for non-authoritative data.
///
/// Implementations provide atomic per-key operations; no cross-key
/// transactions are assumed.
#[async_trait]
pub trait SideStore: Send + Sync + 'static {
    /// Cache an L1 deposit for downstream auto-claim.
    async fn add_block_deposit(&self, deposit: &Deposit) -> SyncResult<()>;

    /// Append a large transfer to the bucket under `key`.
    async fn add_large_transaction(&self, key: &str, record: &LargeTransferRecord)
        -> SyncResult<()>;

    /// Drop the bucket under `key`.
    async fn del_large_transactions(&self, key: &str) -> SyncResult<()>;

    /// USD prices of the given tokens; unknown tokens are omitted.
    async fn get_coin_price(&self, symbols: &[SymbolInfo]) -> SyncResult<Vec<PriceInfo>>;

    /// Rolling average of the rollup batch commit duration in minutes.
    async fn get_avg_commit_duration(&self) -> SyncResult<Option<u32>>;
}

/// Transfer-status producer.
#[async_trait]
pub trait BrokerProducer: Send + Sync {
    /// Publish a status change.
    async fn push_transaction_update(&self, notification: &TransferNotification)
        -> SyncResult<()>;
}

/// Estimated minutes until a new deposit can be claimed.
#[async_trait]
pub trait EstimateTimeProvider: Send + Sync {
    /// Deterministic estimate for deposits on `network_id`.
    fn deposit_estimate(&self, network_id: NetworkId) -> u32;

    /// Rolling average used for rollup deposits.
    async fn avg_commit_duration(&self) -> u32;
}

/// Fills token metadata into pending notifications.
#[async_trait]
pub trait TokenMetadataEnricher: Send + Sync {
    /// Set `logo_info` on every pending notification whose key is known.
    async fn fill_token_infos(&self, pending: &mut HashMap<TokenKey, Vec<TransferNotification>>);
}

/// Source of token metadata behind the caching enricher.
#[async_trait]
pub trait TokenInfoSource: Send + Sync {
    /// Metadata of the requested tokens; unknown tokens are omitted.
    async fn fetch_token_infos(
        &self,
        keys: &[TokenKey],
    ) -> SyncResult<HashMap<TokenKey, TokenInfo>>;
}

/// Metrics collaborator.
pub trait MetricsSink: Send + Sync {
    /// One processed deposit.
    fn record_order(&self, order: &OrderMetric);

    /// Latest chain head of `network_id`.
    fn record_latest_block_num(&self, network_id: NetworkId, height: u64);

    /// A background task failed.
    fn record_side_effect_failure(&self, task: &str);
}

/// Chain RPC client.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Header at `number`, or the latest header for `None`.
    async fn header_by_number(&self, number: Option<u64>) -> SyncResult<ChainHeader>;
}
