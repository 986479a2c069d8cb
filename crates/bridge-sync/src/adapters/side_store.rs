//! In-memory side store.
//!
//! Mirrors the key layout of the production cache: block deposits per
//! network, large-transfer buckets keyed `"<chain>:<YYYYMMDD>"`, coin prices
//! keyed by chain id and lowercase token address.

use crate::domain::{Deposit, LargeTransferRecord, PriceInfo, SymbolInfo};
use crate::error::{SyncError, SyncResult};
use crate::ports::SideStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Side store held in process memory.
#[derive(Default)]
pub struct InMemorySideStore {
    block_deposits: RwLock<Vec<Deposit>>,
    large_transactions: RwLock<HashMap<String, Vec<LargeTransferRecord>>>,
    deleted_keys: RwLock<Vec<String>>,
    prices: RwLock<HashMap<(u64, String), PriceInfo>>,
    avg_commit_duration: RwLock<Option<u32>>,
    fail_block_deposits: AtomicBool,
    fail_large_tx_writes: AtomicBool,
}

impl InMemorySideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price returned for a token.
    pub fn set_price(&self, price: PriceInfo) {
        let key = (price.chain_id, price.address.to_lowercase());
        self.prices.write().insert(key, price);
    }

    /// Set the rolling commit duration.
    pub fn set_avg_commit_duration(&self, minutes: Option<u32>) {
        *self.avg_commit_duration.write() = minutes;
    }

    /// Make `add_block_deposit` fail.
    pub fn fail_block_deposits(&self, fail: bool) {
        self.fail_block_deposits.store(fail, Ordering::SeqCst);
    }

    /// Make `add_large_transaction` fail.
    pub fn fail_large_tx_writes(&self, fail: bool) {
        self.fail_large_tx_writes.store(fail, Ordering::SeqCst);
    }

    pub fn block_deposits(&self) -> Vec<Deposit> {
        self.block_deposits.read().clone()
    }

    pub fn large_transactions(&self, key: &str) -> Vec<LargeTransferRecord> {
        self.large_transactions
            .read()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Keys passed to `del_large_transactions`, in call order.
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted_keys.read().clone()
    }
}

#[async_trait]
impl SideStore for InMemorySideStore {
    async fn add_block_deposit(&self, deposit: &Deposit) -> SyncResult<()> {
        if self.fail_block_deposits.load(Ordering::SeqCst) {
            return Err(SyncError::SideStore {
                reason: "block deposit write rejected".to_string(),
            });
        }
        self.block_deposits.write().push(deposit.clone());
        Ok(())
    }

    async fn add_large_transaction(
        &self,
        key: &str,
        record: &LargeTransferRecord,
    ) -> SyncResult<()> {
        if self.fail_large_tx_writes.load(Ordering::SeqCst) {
            return Err(SyncError::SideStore {
                reason: format!("large transaction write rejected for {key}"),
            });
        }
        self.large_transactions
            .write()
            .entry(key.to_string())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn del_large_transactions(&self, key: &str) -> SyncResult<()> {
        self.large_transactions.write().remove(key);
        self.deleted_keys.write().push(key.to_string());
        Ok(())
    }

    async fn get_coin_price(&self, symbols: &[SymbolInfo]) -> SyncResult<Vec<PriceInfo>> {
        let prices = self.prices.read();
        Ok(symbols
            .iter()
            .filter_map(|s| prices.get(&(s.chain_id, s.address.to_lowercase())).cloned())
            .collect())
    }

    async fn get_avg_commit_duration(&self) -> SyncResult<Option<u32>> {
        Ok(*self.avg_commit_duration.read())
    }
}
