//! Large transfer monitor.
//!
//! Values an enriched deposit notification in USD and, at or above the
//! configured limit, appends it to the destination chain's bucket for today.
//! The bucket that just left the retention window is deleted right after.

use crate::algorithms::{expired_large_tx_key, large_tx_key, token_amount, usd_value};
use crate::domain::{ChainId, LargeTransferRecord, SymbolInfo, TokenInfo, TransferNotification};
use crate::ports::SideStore;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of inspecting one transfer.
#[derive(Clone, Debug, PartialEq)]
pub enum MonitorOutcome {
    /// No price for the token.
    NoPrice,
    /// Amount is not a decimal integer.
    UnparsableAmount,
    /// Valued below the limit.
    BelowThreshold { usd_amount: f64 },
    /// Cached as a large transfer.
    Recorded { usd_amount: f64 },
}

pub struct LargeTransferMonitor {
    side_store: Arc<dyn SideStore>,
    usd_limit: f64,
    retention_days: u32,
}

impl LargeTransferMonitor {
    pub fn new(side_store: Arc<dyn SideStore>, usd_limit: f64, retention_days: u32) -> Self {
        Self {
            side_store,
            usd_limit,
            retention_days,
        }
    }

    /// Inspect a transfer against today's (UTC) bucket.
    pub async fn inspect(
        &self,
        notification: &TransferNotification,
        token: &TokenInfo,
        chain_id: ChainId,
    ) -> MonitorOutcome {
        self.inspect_on(notification, token, chain_id, Utc::now().date_naive())
            .await
    }

    /// Inspect a transfer against the bucket of `today`.
    pub async fn inspect_on(
        &self,
        notification: &TransferNotification,
        token: &TokenInfo,
        chain_id: ChainId,
        today: NaiveDate,
    ) -> MonitorOutcome {
        let symbol = SymbolInfo {
            chain_id,
            address: notification.bridge_token.clone(),
        };
        let price = match self
            .side_store
            .get_coin_price(std::slice::from_ref(&symbol))
            .await
        {
            Ok(prices) => match prices.first() {
                Some(info) => info.price,
                None => {
                    warn!(
                        token = %symbol.address,
                        chain_id,
                        tx_hash = %notification.tx_hash,
                        "[bridge-sync] no coin price, skip large transfer check"
                    );
                    return MonitorOutcome::NoPrice;
                }
            },
            Err(e) => {
                error!(
                    token = %symbol.address,
                    chain_id,
                    error = %e,
                    "[bridge-sync] coin price lookup failed, skip large transfer check"
                );
                return MonitorOutcome::NoPrice;
            }
        };

        let Some(amount) = token_amount(&notification.token_amount, token.decimals) else {
            error!(
                amount = %notification.token_amount,
                tx_hash = %notification.tx_hash,
                "[bridge-sync] cannot convert token amount, skip large transfer check"
            );
            return MonitorOutcome::UnparsableAmount;
        };

        let usd_amount = usd_value(price, amount);
        if usd_amount < self.usd_limit {
            debug!(
                usd_amount,
                limit = self.usd_limit,
                tx_hash = %notification.tx_hash,
                "[bridge-sync] transfer below large tx limit"
            );
            return MonitorOutcome::BelowThreshold { usd_amount };
        }

        self.refresh_cache(notification, token, chain_id, amount, usd_amount, today)
            .await;
        MonitorOutcome::Recorded { usd_amount }
    }

    async fn refresh_cache(
        &self,
        notification: &TransferNotification,
        token: &TokenInfo,
        chain_id: ChainId,
        amount: f64,
        usd_amount: f64,
        today: NaiveDate,
    ) {
        let record = LargeTransferRecord {
            chain_id,
            symbol: token.symbol.clone(),
            amount,
            usd_amount,
            hash: notification.tx_hash.clone(),
            address: notification.dest_addr.clone(),
        };

        let key = large_tx_key(notification.to_chain, today);
        match self.side_store.add_large_transaction(&key, &record).await {
            Ok(()) => info!(
                key = %key,
                usd_amount,
                symbol = %record.symbol,
                tx_hash = %record.hash,
                "[bridge-sync] large transfer cached"
            ),
            Err(e) => error!(
                key = %key,
                tx_hash = %record.hash,
                error = %e,
                "[bridge-sync] failed to cache large transfer"
            ),
        }

        let expired = expired_large_tx_key(notification.to_chain, today, self.retention_days);
        if let Err(e) = self.side_store.del_large_transactions(&expired).await {
            error!(
                key = %expired,
                error = %e,
                "[bridge-sync] failed to delete expired large transfers"
            );
        }
    }
}
