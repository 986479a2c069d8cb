//! Claim-time estimates.

use crate::config::SyncConfig;
use crate::domain::{NetworkId, MAINNET_NETWORK_ID};
use crate::ports::{EstimateTimeProvider, SideStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// L1 deposits use a fixed estimate; rollup deposits use the rolling commit
/// duration from the side store, or a default when none is cached.
pub struct DefaultEstimateTime {
    l1_minutes: u32,
    l2_default_minutes: u32,
    side_store: Arc<dyn SideStore>,
}

impl DefaultEstimateTime {
    pub fn new(l1_minutes: u32, l2_default_minutes: u32, side_store: Arc<dyn SideStore>) -> Self {
        Self {
            l1_minutes,
            l2_default_minutes,
            side_store,
        }
    }

    /// Estimates taken from `l1_estimate_minutes` and
    /// `l2_default_estimate_minutes`.
    pub fn from_config(config: &SyncConfig, side_store: Arc<dyn SideStore>) -> Self {
        Self::new(
            config.l1_estimate_minutes,
            config.l2_default_estimate_minutes,
            side_store,
        )
    }
}

#[async_trait]
impl EstimateTimeProvider for DefaultEstimateTime {
    fn deposit_estimate(&self, network_id: NetworkId) -> u32 {
        if network_id == MAINNET_NETWORK_ID {
            self.l1_minutes
        } else {
            self.l2_default_minutes
        }
    }

    async fn avg_commit_duration(&self) -> u32 {
        match self.side_store.get_avg_commit_duration().await {
            Ok(Some(minutes)) if minutes > 0 => minutes,
            Ok(_) => self.l2_default_minutes,
            Err(e) => {
                warn!(error = %e, "[bridge-sync] avg commit duration unavailable, using default");
                self.l2_default_minutes
            }
        }
    }
}
