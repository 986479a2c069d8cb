//! In-memory chain client.
//!
//! Serves synthetic headers up to a settable head. Used by the poller tests and
//! by deployments that feed the head from another component.

use crate::domain::{ChainHeader, TxHash};
use crate::error::{SyncError, SyncResult};
use crate::ports::ChainClient;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Chain client with a manually advanced head.
#[derive(Default)]
pub struct InMemoryChainClient {
    height: AtomicU64,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryChainClient {
    pub fn new(height: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
            ..Default::default()
        }
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    /// Make every call fail.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Deterministic header hash.
fn make_block_hash(number: u64) -> TxHash {
    let mut hash = [0u8; 32];
    hash[24..].copy_from_slice(&number.to_be_bytes());
    TxHash::from(hash)
}

#[async_trait]
impl ChainClient for InMemoryChainClient {
    async fn header_by_number(&self, number: Option<u64>) -> SyncResult<ChainHeader> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SyncError::ChainClient {
                reason: "rpc unavailable".to_string(),
            });
        }

        let head = self.height.load(Ordering::SeqCst);
        let number = number.unwrap_or(head);
        if number > head {
            return Err(SyncError::ChainClient {
                reason: format!("header {number} not found, head is {head}"),
            });
        }
        Ok(ChainHeader {
            number,
            hash: make_block_hash(number),
            timestamp: 1_700_000_000 + number * 12,
        })
    }
}
