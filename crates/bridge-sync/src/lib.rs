//! # bridge-sync
//!
//! Post-processing of decoded bridge events for a layer-2 bridge indexer.
//!
//! ## Overview
//!
//! This crate provides:
//! - **Global index codec**: cross-chain unique transfer ids
//! - **Deposit normalization**: end-user recipients for wrapped-stablecoin messages
//! - **Notifications**: Created/Claimed status pushes with token metadata
//! - **Large transfer monitoring**: USD-valued buckets per destination chain
//! - **Chain head polling**: latest block number as a metric
//!
//! ## Architecture
//!
//! ```text
//! sync loop ──deposit──→ ChainEventSynchronizer ──(mainnet)──→ SideStore (rollback on failure)
//!                                │
//!                                └──→ SideEffectPool ──→ NotificationDispatcher ──→ BrokerProducer
//!                                                                 │
//!                                                                 └──→ LargeTransferMonitor ──→ SideStore
//!
//! ChainHeadPoller ──header_by_number──→ MetricsSink
//! ```
//!
//! Only the mainnet block-deposit cache write and the primary-store write can
//! fail a call; every other failure is logged and counted.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bridge_sync::{ChainEventSynchronizer, Collaborators, SyncConfig, TokenRegistry};
//!
//! let sync = ChainEventSynchronizer::new(config, registry, collaborators)?;
//! let id = sync.process_deposit(deposit, &mut tx).await?;
//! sync.process_claim(claim, &mut tx).await?;
//! sync.shutdown().await;
//! ```

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod poller;
pub mod ports;
pub mod service;
pub mod task_pool;

pub use algorithms::TokenRegistry;
pub use config::{BrokerConfig, BusinessConfig, SyncConfig};
pub use dispatcher::{DispatchOutcome, NotificationDispatcher, SkipReason};
pub use domain::{
    Address, ChainHeader, Claim, Deposit, GlobalIndex, LeafType, NetworkId, TransferNotification,
    TransferStatus, TxHash,
};
pub use error::{SyncError, SyncResult};
pub use monitor::{LargeTransferMonitor, MonitorOutcome};
pub use poller::ChainHeadPoller;
pub use ports::{BridgeEventSink, PrimaryStore, SideStore};
pub use service::{transfer_global_index, ChainEventSynchronizer, Collaborators};
pub use task_pool::SideEffectPool;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
