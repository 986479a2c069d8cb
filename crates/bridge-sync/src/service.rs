//! Chain event synchronizer - post-processing of decoded bridge events.
//!
//! The synchronization loop hands every deposit and claim it persists to
//! [`ChainEventSynchronizer`]. The only work done on the ledger path is the
//! mainnet block-deposit cache write (with rollback on failure); notifications,
//! enrichment and large-transfer monitoring run in the [`SideEffectPool`].

use crate::algorithms::{
    global_index, normalize_deposit, replace_stablecoin_deposit_info, TokenRegistry,
};
use crate::config::SyncConfig;
use crate::dispatcher::NotificationDispatcher;
use crate::domain::{Claim, Deposit, GlobalIndex, OrderMetric};
use crate::error::{SyncError, SyncResult};
use crate::monitor::LargeTransferMonitor;
use crate::poller::ChainHeadPoller;
use crate::ports::{
    BridgeEventSink, BrokerProducer, ChainClient, EstimateTimeProvider, MetricsSink,
    PrimaryStore, SideStore, TokenMetadataEnricher,
};
use crate::task_pool::SideEffectPool;
use async_trait::async_trait;
use bridge_telemetry::{log_claim_event, log_deposit_event};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Outbound collaborators of the synchronizer.
pub struct Collaborators<P: PrimaryStore> {
    pub primary: Arc<P>,
    pub side_store: Arc<dyn SideStore>,
    /// Absent when no broker is configured; notifications are then skipped.
    pub producer: Option<Arc<dyn BrokerProducer>>,
    pub estimator: Arc<dyn EstimateTimeProvider>,
    pub enricher: Arc<dyn TokenMetadataEnricher>,
    pub metrics: Arc<dyn MetricsSink>,
}

/// Global index of the transfer a deposit starts.
///
/// Mainnet deposits carry rollup index 0 so the value is the canonical
/// `2^64 + deposit_count`.
pub fn transfer_global_index(deposit: &Deposit, rollup_id: u32) -> GlobalIndex {
    if deposit.is_mainnet() {
        global_index::encode(true, 0, deposit.deposit_count)
    } else {
        global_index::encode(false, rollup_id.saturating_sub(1), deposit.deposit_count)
    }
}

/// Post-processing hooks of the synchronization loop.
pub struct ChainEventSynchronizer<P: PrimaryStore> {
    config: Arc<SyncConfig>,
    registry: Arc<TokenRegistry>,
    primary: Arc<P>,
    side_store: Arc<dyn SideStore>,
    dispatcher: Arc<NotificationDispatcher>,
    metrics: Arc<dyn MetricsSink>,
    pool: SideEffectPool,
}

impl<P: PrimaryStore> ChainEventSynchronizer<P> {
    pub fn new(
        config: SyncConfig,
        registry: TokenRegistry,
        collaborators: Collaborators<P>,
    ) -> SyncResult<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let registry = Arc::new(registry);

        let monitor = Arc::new(LargeTransferMonitor::new(
            collaborators.side_store.clone(),
            config.large_tx_usd_limit,
            config.large_tx_retention_days,
        ));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            collaborators.producer,
            collaborators.estimator,
            collaborators.enricher,
            monitor,
            registry.clone(),
            config.clone(),
        ));
        let pool = SideEffectPool::new(config.max_in_flight_tasks, collaborators.metrics.clone());

        Ok(Self {
            config,
            registry,
            primary: collaborators.primary,
            side_store: collaborators.side_store,
            dispatcher,
            metrics: collaborators.metrics,
            pool,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn pool(&self) -> &SideEffectPool {
        &self.pool
    }

    /// Rewrite a wrapped-stablecoin message deposit so the recipient is the
    /// end user rather than the relay contract.
    pub fn before_process_deposit(&self, deposit: &mut Deposit) {
        normalize_deposit(deposit, &self.registry);
    }

    pub async fn after_process_deposit(
        &self,
        mut deposit: Deposit,
        deposit_id: u64,
        tx: &mut P::Tx,
    ) -> SyncResult<()> {
        // Downstream auto-claim reads L1 deposits from the cache
        if deposit.is_mainnet() {
            if let Err(e) = self.side_store.add_block_deposit(&deposit).await {
                log_deposit_event!(
                    error,
                    self.config.network_id,
                    deposit,
                    "[bridge-sync] failed to add block deposit to side store",
                    error = %e
                );
                if let Err(rollback_err) = self.primary.rollback(tx).await {
                    log_deposit_event!(
                        error,
                        self.config.network_id,
                        deposit,
                        "[bridge-sync] rollback after side store failure failed",
                        rollback_error = %rollback_err,
                        error = %e
                    );
                    return Err(SyncError::Rollback {
                        reason: rollback_err.to_string(),
                    });
                }
                return Err(e);
            }
        }

        // The skip rule needs the address before the display replacement
        let orig_address = deposit.origin_address;
        replace_stablecoin_deposit_info(&mut deposit, &self.registry, true);

        let order = OrderMetric {
            from_network: deposit.network_id,
            to_network: deposit.destination_network,
            leaf_type: deposit.leaf_type.as_u8(),
            origin_network: deposit.origin_network,
            token: deposit.origin_address,
            amount: deposit.amount,
        };

        let gi = transfer_global_index(&deposit, self.config.rollup_id);
        let dispatcher = self.dispatcher.clone();
        let submitted = self
            .pool
            .submit("deposit-created", async move {
                dispatcher
                    .dispatch_deposit_created(&deposit, deposit_id, orig_address, gi)
                    .await
                    .map(|_| ())
            })
            .await;
        if let Err(e) = submitted {
            tracing::warn!(
                deposit_id,
                error = %e,
                "[bridge-sync] deposit notification not scheduled"
            );
        }

        self.metrics.record_order(&order);
        Ok(())
    }

    /// Schedule the Claimed notification. Never fails the caller.
    pub async fn after_process_claim(&self, claim: Claim) -> SyncResult<()> {
        if !self.dispatcher.has_producer() {
            log_claim_event!(
                error,
                self.config.network_id,
                claim,
                "[bridge-sync] push producer missing, cannot push tx status change"
            );
            return Ok(());
        }

        let primary = self.primary.clone();
        let dispatcher = self.dispatcher.clone();
        let rollup_id = self.config.rollup_id;
        let network_id = self.config.network_id;
        let submitted = self
            .pool
            .submit("claim-pushed", async move {
                let origin_network = match claim.deposit_network() {
                    Ok(network) => network,
                    Err(e) => {
                        log_claim_event!(
                            error,
                            network_id,
                            claim,
                            "[bridge-sync] claim has no deposit network",
                            error = %e
                        );
                        return Err(e);
                    }
                };
                let deposit = match primary.get_deposit(claim.index, origin_network, None).await {
                    Ok(deposit) => deposit,
                    Err(e) => {
                        log_claim_event!(
                            error,
                            network_id,
                            claim,
                            "[bridge-sync] deposit of claim not found",
                            origin_network,
                            error = %e
                        );
                        return Err(e);
                    }
                };
                let gi = transfer_global_index(&deposit, rollup_id);
                dispatcher
                    .dispatch_claimed(&deposit, &claim, gi)
                    .await
                    .map(|_| ())
            })
            .await;
        if let Err(e) = submitted {
            tracing::warn!(error = %e, "[bridge-sync] claim notification not scheduled");
        }
        Ok(())
    }

    /// Normalize, persist inside `tx`, then post-process.
    pub async fn process_deposit(&self, mut deposit: Deposit, tx: &mut P::Tx) -> SyncResult<u64> {
        self.before_process_deposit(&mut deposit);
        let deposit_id = self.primary.add_deposit(&deposit, tx).await?;
        self.after_process_deposit(deposit, deposit_id, tx).await?;
        Ok(deposit_id)
    }

    /// Persist inside `tx`, then post-process.
    pub async fn process_claim(&self, claim: Claim, tx: &mut P::Tx) -> SyncResult<()> {
        self.primary.add_claim(&claim, tx).await?;
        self.after_process_claim(claim).await
    }

    /// Start the head poller for the watched network. It stops on
    /// [`Self::shutdown`].
    pub fn spawn_head_poller(&self, client: Arc<dyn ChainClient>) -> JoinHandle<()> {
        let poller = ChainHeadPoller::new(
            client,
            self.metrics.clone(),
            self.config.network_id,
            self.config.head_poll_interval(),
        );
        poller.spawn(self.pool.cancel_token().child_token())
    }

    /// Wait for all scheduled side effects.
    pub async fn wait_idle(&self) {
        self.pool.wait_idle().await;
    }

    /// Cancel side effects and the head poller.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

#[async_trait]
impl<P: PrimaryStore> BridgeEventSink for ChainEventSynchronizer<P> {
    type Tx = P::Tx;

    async fn process_deposit(&self, deposit: Deposit, tx: &mut P::Tx) -> SyncResult<u64> {
        ChainEventSynchronizer::process_deposit(self, deposit, tx).await
    }

    async fn process_claim(&self, claim: Claim, tx: &mut P::Tx) -> SyncResult<()> {
        ChainEventSynchronizer::process_claim(self, claim, tx).await
    }

    fn before_process_deposit(&self, deposit: &mut Deposit) {
        ChainEventSynchronizer::before_process_deposit(self, deposit)
    }

    async fn after_process_deposit(
        &self,
        deposit: Deposit,
        deposit_id: u64,
        tx: &mut P::Tx,
    ) -> SyncResult<()> {
        ChainEventSynchronizer::after_process_deposit(self, deposit, deposit_id, tx).await
    }

    async fn after_process_claim(&self, claim: Claim) -> SyncResult<()> {
        ChainEventSynchronizer::after_process_claim(self, claim).await
    }
}
