//! # Inbound Ports
//!
//! What the synchronization loop calls for every decoded bridge event.

use crate::domain::{Claim, Deposit};
use crate::error::SyncResult;
use async_trait::async_trait;

/// Bridge event post-processing API - inbound port.
#[async_trait]
pub trait BridgeEventSink: Send + Sync {
    /// Open transaction handle of the primary store.
    type Tx: Send;

    /// Normalize, persist inside `tx` and post-process a deposit.
    /// Returns the persistence id.
    async fn process_deposit(&self, deposit: Deposit, tx: &mut Self::Tx) -> SyncResult<u64>;

    /// Persist inside `tx` and post-process a claim.
    async fn process_claim(&self, claim: Claim, tx: &mut Self::Tx) -> SyncResult<()>;

    /// Rewrite a wrapped-stablecoin message deposit in place.
    fn before_process_deposit(&self, deposit: &mut Deposit);

    /// Critical-path cache write, then background notification and metrics.
    async fn after_process_deposit(
        &self,
        deposit: Deposit,
        deposit_id: u64,
        tx: &mut Self::Tx,
    ) -> SyncResult<()>;

    /// Background claim notification.
    async fn after_process_claim(&self, claim: Claim) -> SyncResult<()>;
}
