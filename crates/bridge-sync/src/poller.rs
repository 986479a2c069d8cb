//! Chain head poller.
//!
//! Publishes the latest block number of the watched network on a fixed
//! interval until cancelled.

use crate::domain::NetworkId;
use crate::error::SyncResult;
use crate::ports::{ChainClient, MetricsSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub struct ChainHeadPoller {
    client: Arc<dyn ChainClient>,
    metrics: Arc<dyn MetricsSink>,
    network_id: NetworkId,
    interval: Duration,
}

impl ChainHeadPoller {
    pub fn new(
        client: Arc<dyn ChainClient>,
        metrics: Arc<dyn MetricsSink>,
        network_id: NetworkId,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            metrics,
            network_id,
            interval,
        }
    }

    /// Fetch the head once and record it.
    pub async fn poll_once(&self) -> SyncResult<u64> {
        let header = self.client.header_by_number(None).await?;
        self.metrics
            .record_latest_block_num(self.network_id, header.number);
        debug!(
            network_id = self.network_id,
            height = header.number,
            "[bridge-sync] latest block recorded"
        );
        Ok(header.number)
    }

    /// Poll until `cancel` fires. Errors are logged and the loop continues.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            network_id = self.network_id,
            interval_ms = self.interval.as_millis() as u64,
            "[bridge-sync] chain head poller started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        error!(
                            network_id = self.network_id,
                            error = %e,
                            "[bridge-sync] header by number failed"
                        );
                    }
                }
            }
        }
        info!(network_id = self.network_id, "[bridge-sync] chain head poller stopped");
    }

    /// Run on the current runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
