//! Synchronizer configuration.
//!
//! Every section has a `Default`, deserializes from a config file with
//! missing fields falling back to defaults, and `SyncConfig` can also be read
//! from environment variables.

use crate::domain::{Address, ChainId, NetworkId};
use crate::error::{SyncError, SyncResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Core synchronizer settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Network this synchronizer instance watches
    pub network_id: NetworkId,
    /// Rollup id of the watched rollup (1-based)
    pub rollup_id: u32,
    /// Rollup network this deployment sends notifications for
    pub home_network_id: NetworkId,
    /// USD value at or above which a transfer is cached as large
    pub large_tx_usd_limit: f64,
    /// Days a large-transfer bucket is kept before it is deleted
    pub large_tx_retention_days: u32,
    /// Maximum background side-effect tasks in flight
    pub max_in_flight_tasks: usize,
    /// Chain head polling interval in milliseconds
    pub head_poll_interval_ms: u64,
    /// Claim estimate in minutes for L1 deposits
    pub l1_estimate_minutes: u32,
    /// Claim estimate in minutes for rollup deposits when no average is cached
    pub l2_default_estimate_minutes: u32,
    /// Bridge network id to EVM chain id
    pub chain_ids: HashMap<NetworkId, ChainId>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            network_id: 0,
            rollup_id: 1,
            home_network_id: 1,
            large_tx_usd_limit: 100_000.0,
            large_tx_retention_days: 2,
            max_in_flight_tasks: 256,
            head_poll_interval_ms: 2_000,
            l1_estimate_minutes: 15,
            l2_default_estimate_minutes: 60,
            chain_ids: HashMap::new(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> SyncResult<Option<T>> {
    match env::var(name) {
        Ok(value) => value.parse().map(Some).map_err(|_| SyncError::Config {
            reason: format!("{name}={value} is not valid"),
        }),
        Err(_) => Ok(None),
    }
}

impl SyncConfig {
    /// Read overrides from environment variables on top of the defaults.
    ///
    /// # Environment Variables
    ///
    /// - `BRIDGE_NETWORK_ID`
    /// - `BRIDGE_ROLLUP_ID`
    /// - `BRIDGE_HOME_NETWORK_ID`
    /// - `BRIDGE_LARGE_TX_USD_LIMIT`
    /// - `BRIDGE_LARGE_TX_RETENTION_DAYS`
    /// - `BRIDGE_MAX_IN_FLIGHT`
    /// - `BRIDGE_HEAD_POLL_INTERVAL_MS`
    pub fn from_env() -> SyncResult<Self> {
        let mut config = Self::default();
        if let Some(v) = env_parse("BRIDGE_NETWORK_ID")? {
            config.network_id = v;
        }
        if let Some(v) = env_parse("BRIDGE_ROLLUP_ID")? {
            config.rollup_id = v;
        }
        if let Some(v) = env_parse("BRIDGE_HOME_NETWORK_ID")? {
            config.home_network_id = v;
        }
        if let Some(v) = env_parse("BRIDGE_LARGE_TX_USD_LIMIT")? {
            config.large_tx_usd_limit = v;
        }
        if let Some(v) = env_parse("BRIDGE_LARGE_TX_RETENTION_DAYS")? {
            config.large_tx_retention_days = v;
        }
        if let Some(v) = env_parse("BRIDGE_MAX_IN_FLIGHT")? {
            config.max_in_flight_tasks = v;
        }
        if let Some(v) = env_parse("BRIDGE_HEAD_POLL_INTERVAL_MS")? {
            config.head_poll_interval_ms = v;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the synchronizer cannot run with.
    pub fn validate(&self) -> SyncResult<()> {
        if self.rollup_id == 0 {
            return Err(SyncError::Config {
                reason: "rollup_id is 1-based".to_string(),
            });
        }
        if self.max_in_flight_tasks == 0 {
            return Err(SyncError::Config {
                reason: "max_in_flight_tasks must be positive".to_string(),
            });
        }
        if self.head_poll_interval_ms == 0 {
            return Err(SyncError::Config {
                reason: "head_poll_interval_ms must be positive".to_string(),
            });
        }
        if !self.large_tx_usd_limit.is_finite() || self.large_tx_usd_limit < 0.0 {
            return Err(SyncError::Config {
                reason: format!("large_tx_usd_limit {} is not usable", self.large_tx_usd_limit),
            });
        }
        Ok(())
    }

    /// Chain head polling interval.
    pub fn head_poll_interval(&self) -> Duration {
        Duration::from_millis(self.head_poll_interval_ms)
    }

    /// EVM chain id of a bridge network, 0 when unknown.
    pub fn chain_id(&self, network_id: NetworkId) -> ChainId {
        self.chain_ids.get(&network_id).copied().unwrap_or_default()
    }
}

/// Token lists maintained by the business side.
///
/// Contract and token lists pair by position: the n-th contract is the bridge
/// wrapper of the n-th token.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BusinessConfig {
    #[serde(rename = "USDCContractAddresses")]
    pub usdc_contract_addresses: Vec<Address>,
    #[serde(rename = "USDCTokenAddresses")]
    pub usdc_token_addresses: Vec<Address>,
}

/// Message broker settings. Connection and TLS setup live in the transport.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub topic: String,
    pub push_key: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            topic: "bridge-tx-status".to_string(),
            push_key: String::new(),
        }
    }
}
