//! In-memory primary store with explicit transactions.
//!
//! Writes land in the transaction until [`InMemoryPrimaryStore::commit`];
//! a rolled-back transaction discards them and refuses further writes.

use crate::domain::{Claim, Deposit, NetworkId};
use crate::error::{SyncError, SyncResult};
use crate::ports::PrimaryStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Open transaction of [`InMemoryPrimaryStore`].
#[derive(Debug, Default)]
pub struct InMemoryTx {
    deposits: Vec<(u64, Deposit)>,
    claims: Vec<Claim>,
    rolled_back: bool,
}

impl InMemoryTx {
    pub fn is_rolled_back(&self) -> bool {
        self.rolled_back
    }

    pub fn pending_deposits(&self) -> usize {
        self.deposits.len()
    }

    fn ensure_open(&self) -> SyncResult<()> {
        if self.rolled_back {
            return Err(SyncError::PrimaryStore {
                reason: "transaction already rolled back".to_string(),
            });
        }
        Ok(())
    }
}

/// Primary store held in process memory.
pub struct InMemoryPrimaryStore {
    deposits: RwLock<HashMap<(NetworkId, u32), Deposit>>,
    claims: RwLock<Vec<Claim>>,
    next_id: AtomicU64,
    fail_rollback: AtomicBool,
}

impl InMemoryPrimaryStore {
    pub fn new() -> Self {
        Self {
            deposits: RwLock::new(HashMap::new()),
            claims: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            fail_rollback: AtomicBool::new(false),
        }
    }

    /// Start a transaction.
    pub fn begin(&self) -> InMemoryTx {
        InMemoryTx::default()
    }

    /// Apply the writes of `tx`.
    pub fn commit(&self, tx: InMemoryTx) -> SyncResult<()> {
        tx.ensure_open()?;
        let mut deposits = self.deposits.write();
        for (_, deposit) in tx.deposits {
            deposits.insert((deposit.network_id, deposit.deposit_count), deposit);
        }
        self.claims.write().extend(tx.claims);
        Ok(())
    }

    /// Make `rollback` fail.
    pub fn fail_rollback(&self, fail: bool) {
        self.fail_rollback.store(fail, Ordering::SeqCst);
    }

    /// Insert a committed deposit directly.
    pub fn seed_deposit(&self, deposit: Deposit) {
        self.deposits
            .write()
            .insert((deposit.network_id, deposit.deposit_count), deposit);
    }

    pub fn deposit_count(&self) -> usize {
        self.deposits.read().len()
    }

    pub fn claims(&self) -> Vec<Claim> {
        self.claims.read().clone()
    }
}

impl Default for InMemoryPrimaryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrimaryStore for InMemoryPrimaryStore {
    type Tx = InMemoryTx;

    async fn add_deposit(&self, deposit: &Deposit, tx: &mut InMemoryTx) -> SyncResult<u64> {
        tx.ensure_open()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        tx.deposits.push((id, deposit.clone()));
        Ok(id)
    }

    async fn add_claim(&self, claim: &Claim, tx: &mut InMemoryTx) -> SyncResult<()> {
        tx.ensure_open()?;
        tx.claims.push(claim.clone());
        Ok(())
    }

    async fn get_deposit(
        &self,
        deposit_count: u32,
        network_id: NetworkId,
        tx: Option<&mut InMemoryTx>,
    ) -> SyncResult<Deposit> {
        if let Some(tx) = tx {
            if let Some((_, deposit)) = tx
                .deposits
                .iter()
                .find(|(_, d)| d.deposit_count == deposit_count && d.network_id == network_id)
            {
                return Ok(deposit.clone());
            }
        }
        self.deposits
            .read()
            .get(&(network_id, deposit_count))
            .cloned()
            .ok_or(SyncError::DepositNotFound {
                deposit_count,
                network_id,
            })
    }

    async fn rollback(&self, tx: &mut InMemoryTx) -> SyncResult<()> {
        if self.fail_rollback.load(Ordering::SeqCst) {
            return Err(SyncError::PrimaryStore {
                reason: "rollback rejected".to_string(),
            });
        }
        tx.deposits.clear();
        tx.claims.clear();
        tx.rolled_back = true;
        Ok(())
    }
}
