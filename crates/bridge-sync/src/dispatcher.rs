//! Notification dispatcher.
//!
//! Builds transfer-status notifications for deposits and claims, enriches them
//! with token metadata and pushes them to the broker. Everything here runs in
//! the side-effect pool, off the ledger path.

use crate::algorithms::TokenRegistry;
use crate::config::SyncConfig;
use crate::domain::{
    Address, Claim, Deposit, GlobalIndex, LeafType, TokenKey, TransferNotification,
    TransferStatus, MAINNET_NETWORK_ID,
};
use crate::error::SyncResult;
use crate::monitor::{LargeTransferMonitor, MonitorOutcome};
use crate::ports::{BrokerProducer, EstimateTimeProvider, TokenMetadataEnricher};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Why a notification was not sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoProducer,
    NotAsset,
    ForeignNetworks,
}

/// Result of a dispatch attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    Skipped(SkipReason),
    /// Pushed (or push failed and was logged). Carries the monitor result for
    /// deposits that were enriched.
    Dispatched { monitor: Option<MonitorOutcome> },
}

pub struct NotificationDispatcher {
    producer: Option<Arc<dyn BrokerProducer>>,
    estimator: Arc<dyn EstimateTimeProvider>,
    enricher: Arc<dyn TokenMetadataEnricher>,
    monitor: Arc<LargeTransferMonitor>,
    registry: Arc<TokenRegistry>,
    config: Arc<SyncConfig>,
}

impl NotificationDispatcher {
    pub fn new(
        producer: Option<Arc<dyn BrokerProducer>>,
        estimator: Arc<dyn EstimateTimeProvider>,
        enricher: Arc<dyn TokenMetadataEnricher>,
        monitor: Arc<LargeTransferMonitor>,
        registry: Arc<TokenRegistry>,
        config: Arc<SyncConfig>,
    ) -> Self {
        Self {
            producer,
            estimator,
            enricher,
            monitor,
            registry,
            config,
        }
    }

    pub fn has_producer(&self) -> bool {
        self.producer.is_some()
    }

    /// Message deposits are only pushed when they came from a wrapped
    /// stablecoin contract. `orig_address` is the origin address before the
    /// display replacement.
    fn is_notifiable(&self, leaf_type: LeafType, orig_address: &Address) -> bool {
        leaf_type == LeafType::Asset || self.registry.is_usdc_contract(orig_address)
    }

    /// Push the Created notification of a freshly processed deposit and run
    /// the large transfer check on it.
    pub async fn dispatch_deposit_created(
        &self,
        deposit: &Deposit,
        deposit_id: u64,
        orig_address: Address,
        global_index: GlobalIndex,
    ) -> SyncResult<DispatchOutcome> {
        let Some(producer) = self.producer.as_ref() else {
            error!(
                tx_hash = %deposit.tx_hash,
                "[bridge-sync] push producer missing, cannot push tx status change"
            );
            return Ok(DispatchOutcome::Skipped(SkipReason::NoProducer));
        };
        if !self.is_notifiable(deposit.leaf_type, &orig_address) {
            info!(tx_hash = %deposit.tx_hash, "[bridge-sync] transaction is not asset, skip push");
            return Ok(DispatchOutcome::Skipped(SkipReason::NotAsset));
        }
        let home = self.config.home_network_id;
        if deposit.network_id != home && deposit.destination_network != home {
            info!(
                tx_hash = %deposit.tx_hash,
                home_network = home,
                "[bridge-sync] transaction does not touch home network, skip push and large tx check"
            );
            return Ok(DispatchOutcome::Skipped(SkipReason::ForeignNetworks));
        }

        let estimate_time = if deposit.network_id == MAINNET_NETWORK_ID {
            self.estimator.deposit_estimate(deposit.network_id)
        } else {
            self.estimator.avg_commit_duration().await
        };

        let notification = TransferNotification {
            from_chain: deposit.network_id,
            to_chain: deposit.destination_network,
            bridge_token: deposit.origin_address.to_string(),
            token_amount: deposit.amount.to_string(),
            estimate_time,
            time: unix_millis(&deposit.time),
            tx_hash: deposit.tx_hash.to_string(),
            id: deposit_id,
            index: u64::from(deposit.deposit_count),
            status: TransferStatus::Created.code(),
            block_number: deposit.block_number,
            dest_addr: deposit.destination_address.to_string(),
            from_chain_id: self.config.chain_id(deposit.network_id),
            to_chain_id: self.config.chain_id(deposit.destination_network),
            global_index: global_index.to_string(),
            leaf_type: u32::from(deposit.leaf_type.as_u8()),
            original_network: deposit.origin_network,
            ..Default::default()
        };

        let chain_id = self.config.chain_id(deposit.origin_network);
        let key = TokenKey::new(&notification.bridge_token, chain_id);
        let mut pending = HashMap::from([(key.clone(), vec![notification])]);
        self.enricher.fill_token_infos(&mut pending).await;
        let Some(notification) = pending.remove(&key).and_then(|mut batch| batch.pop()) else {
            return Ok(DispatchOutcome::Dispatched { monitor: None });
        };

        if let Err(e) = producer.push_transaction_update(&notification).await {
            error!(
                tx_hash = %notification.tx_hash,
                error = %e,
                "[bridge-sync] push transaction update failed"
            );
        }

        let monitor = match notification.logo_info.as_ref() {
            Some(token) => Some(self.monitor.inspect(&notification, token, chain_id).await),
            None => {
                info!(
                    tx_hash = %notification.tx_hash,
                    "[bridge-sync] no token info, skip large transaction check"
                );
                None
            }
        };
        Ok(DispatchOutcome::Dispatched { monitor })
    }

    /// Push the Claimed notification for the deposit a claim finalizes.
    pub async fn dispatch_claimed(
        &self,
        deposit: &Deposit,
        claim: &Claim,
        global_index: GlobalIndex,
    ) -> SyncResult<DispatchOutcome> {
        let Some(producer) = self.producer.as_ref() else {
            error!(
                tx_hash = %claim.tx_hash,
                "[bridge-sync] push producer missing, cannot push tx status change"
            );
            return Ok(DispatchOutcome::Skipped(SkipReason::NoProducer));
        };
        if !self.is_notifiable(deposit.leaf_type, &deposit.origin_address) {
            info!(tx_hash = %deposit.tx_hash, "[bridge-sync] transaction is not asset, skip push");
            return Ok(DispatchOutcome::Skipped(SkipReason::NotAsset));
        }

        let notification = TransferNotification {
            from_chain: deposit.network_id,
            to_chain: deposit.destination_network,
            tx_hash: deposit.tx_hash.to_string(),
            index: u64::from(deposit.deposit_count),
            status: TransferStatus::Claimed.code(),
            claim_tx_hash: claim.tx_hash.to_string(),
            claim_time: unix_millis(&claim.time),
            dest_addr: deposit.destination_address.to_string(),
            global_index: global_index.to_string(),
            ..Default::default()
        };
        producer.push_transaction_update(&notification).await?;
        Ok(DispatchOutcome::Dispatched { monitor: None })
    }
}

fn unix_millis(time: &DateTime<Utc>) -> u64 {
    u64::try_from(time.timestamp_millis()).unwrap_or(0)
}
