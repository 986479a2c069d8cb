//! # Deposit and Claim Flows
//!
//! Drives `ChainEventSynchronizer` the way the synchronization loop does:
//! open a primary-store transaction, process events inside it, commit.
//!
//! ## Flows Tested:
//!
//! 1. **Critical path**: mainnet cache write, rollback on failure
//! 2. **Side effects**: broker failures never reach the caller
//! 3. **Skip rules**: non-asset and foreign-network deposits are not pushed
//! 4. **Large transfers**: threshold check writes today's bucket, drops the expired one
//! 5. **Claims**: Claimed status for committed deposits

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use primitive_types::U256;

    use bridge_sync::adapters::{
        CachingTokenEnricher, DefaultEstimateTime, InMemoryMetrics, InMemoryPrimaryStore,
        InMemorySideStore, StaticTokenSource,
    };
    use bridge_sync::algorithms::{encode_bridge_metadata, expired_large_tx_key, large_tx_key};
    use bridge_sync::domain::{PriceInfo, TokenInfo, TokenKey};
    use bridge_sync::ports::BrokerProducer;
    use bridge_sync::{
        Address, BusinessConfig, ChainEventSynchronizer, Claim, Collaborators, Deposit, LeafType,
        SyncConfig, SyncError, SyncResult, TokenRegistry, TransferNotification, TransferStatus,
        TxHash,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const WETH: [u8; 20] = [0x11; 20];
    const USDC_CONTRACT: [u8; 20] = [0xcc; 20];
    const USDC_TOKEN: [u8; 20] = [0xaa; 20];
    const L1_CHAIN_ID: u64 = 1;
    const L2_CHAIN_ID: u64 = 196;

    /// Producer recording every notification; optionally failing or slow.
    #[derive(Default)]
    struct RecordingProducer {
        pushed: Mutex<Vec<TransferNotification>>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl RecordingProducer {
        fn pushed(&self) -> Vec<TransferNotification> {
            self.pushed.lock().clone()
        }
    }

    #[async_trait]
    impl BrokerProducer for RecordingProducer {
        async fn push_transaction_update(
            &self,
            notification: &TransferNotification,
        ) -> SyncResult<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(SyncError::Broker {
                    reason: "broker unavailable".to_string(),
                });
            }
            self.pushed.lock().push(notification.clone());
            Ok(())
        }
    }

    struct Env {
        sync: ChainEventSynchronizer<InMemoryPrimaryStore>,
        primary: Arc<InMemoryPrimaryStore>,
        side_store: Arc<InMemorySideStore>,
        producer: Arc<RecordingProducer>,
        metrics: Arc<InMemoryMetrics>,
    }

    fn weth_info() -> TokenInfo {
        TokenInfo {
            logo_url: "https://logo/weth".to_string(),
            symbol: "WETH".to_string(),
            decimals: 18,
        }
    }

    fn env_with(producer: RecordingProducer, config: SyncConfig) -> Env {
        let primary = Arc::new(InMemoryPrimaryStore::new());
        let side_store = Arc::new(InMemorySideStore::new());
        let producer = Arc::new(producer);
        let metrics = Arc::new(InMemoryMetrics::default());

        let registry = TokenRegistry::from_config(&BusinessConfig {
            usdc_contract_addresses: vec![Address::from(USDC_CONTRACT)],
            usdc_token_addresses: vec![Address::from(USDC_TOKEN)],
        })
        .unwrap();
        let source = StaticTokenSource::new().with_token(
            TokenKey::new(&Address::from(WETH).to_string(), L1_CHAIN_ID),
            weth_info(),
        );

        let estimator = Arc::new(DefaultEstimateTime::from_config(&config, side_store.clone()));
        let sync = ChainEventSynchronizer::new(
            config,
            registry,
            Collaborators {
                primary: primary.clone(),
                side_store: side_store.clone(),
                producer: Some(producer.clone() as Arc<dyn BrokerProducer>),
                estimator,
                enricher: Arc::new(CachingTokenEnricher::new(source)),
                metrics: metrics.clone(),
            },
        )
        .unwrap();

        Env {
            sync,
            primary,
            side_store,
            producer,
            metrics,
        }
    }

    fn default_config() -> SyncConfig {
        SyncConfig {
            network_id: 0,
            rollup_id: 1,
            home_network_id: 1,
            large_tx_usd_limit: 1.0,
            chain_ids: HashMap::from([(0, L1_CHAIN_ID), (1, L2_CHAIN_ID)]),
            ..Default::default()
        }
    }

    fn env() -> Env {
        env_with(RecordingProducer::default(), default_config())
    }

    /// One WETH from L1 to the home rollup.
    fn l1_deposit(deposit_count: u32) -> Deposit {
        Deposit {
            leaf_type: LeafType::Asset,
            origin_network: 0,
            origin_address: Address::from(WETH),
            amount: U256::exp10(18),
            network_id: 0,
            destination_network: 1,
            destination_address: Address::from([0x22; 20]),
            deposit_count,
            block_number: 1_000 + u64::from(deposit_count),
            tx_hash: TxHash::from([deposit_count as u8; 32]),
            time: Utc::now(),
            ..Default::default()
        }
    }

    // =============================================================================
    // CRITICAL PATH
    // =============================================================================

    /// Mainnet side-store failure rolls the transaction back and surfaces
    #[tokio::test]
    async fn test_mainnet_cache_failure_rolls_back() {
        let env = env();
        env.side_store.fail_block_deposits(true);

        let mut tx = env.primary.begin();
        let result = env.sync.process_deposit(l1_deposit(1), &mut tx).await;
        env.sync.wait_idle().await;

        assert!(matches!(result, Err(SyncError::SideStore { .. })));
        assert!(tx.is_rolled_back());
        assert!(env.primary.commit(tx).is_err());
        assert_eq!(env.primary.deposit_count(), 0);
        assert!(env.producer.pushed().is_empty());
        assert!(env.metrics.orders().is_empty());
    }

    /// A failed rollback is what the caller sees
    #[tokio::test]
    async fn test_rollback_failure_reported() {
        let env = env();
        env.side_store.fail_block_deposits(true);
        env.primary.fail_rollback(true);

        let mut tx = env.primary.begin();
        let result = env.sync.process_deposit(l1_deposit(1), &mut tx).await;
        assert!(matches!(result, Err(SyncError::Rollback { .. })));
    }

    /// Broker outage does not fail deposit processing
    #[tokio::test]
    async fn test_broker_failure_does_not_fail_deposit() {
        let env = env_with(
            RecordingProducer {
                fail: true,
                ..Default::default()
            },
            default_config(),
        );

        let mut tx = env.primary.begin();
        env.sync.process_deposit(l1_deposit(5), &mut tx).await.unwrap();
        env.primary.commit(tx).unwrap();
        env.sync.wait_idle().await;

        assert_eq!(env.primary.deposit_count(), 1);
        assert_eq!(env.side_store.block_deposits().len(), 1);
        assert_eq!(env.metrics.orders().len(), 1);
    }

    /// Claim-time estimate of L1 deposits follows the configured minutes
    #[tokio::test]
    async fn test_configured_l1_estimate_reaches_notification() {
        let env = env_with(
            RecordingProducer::default(),
            SyncConfig {
                l1_estimate_minutes: 25,
                ..default_config()
            },
        );

        let mut tx = env.primary.begin();
        env.sync.process_deposit(l1_deposit(3), &mut tx).await.unwrap();
        env.sync.wait_idle().await;

        let pushed = env.producer.pushed();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].estimate_time, 25);
    }

    // =============================================================================
    // SKIP RULES
    // =============================================================================

    #[tokio::test]
    async fn test_plain_message_not_pushed_but_counted() {
        let env = env();
        let deposit = Deposit {
            leaf_type: LeafType::Message,
            ..l1_deposit(2)
        };

        let mut tx = env.primary.begin();
        env.sync.process_deposit(deposit, &mut tx).await.unwrap();
        env.sync.wait_idle().await;

        assert!(env.producer.pushed().is_empty());
        assert_eq!(env.metrics.orders().len(), 1);
        assert_eq!(env.metrics.orders()[0].leaf_type, LeafType::Message.as_u8());
    }

    #[tokio::test]
    async fn test_deposit_between_other_networks_not_pushed() {
        let env = env();
        let deposit = Deposit {
            destination_network: 3,
            ..l1_deposit(3)
        };

        let mut tx = env.primary.begin();
        env.sync.process_deposit(deposit, &mut tx).await.unwrap();
        env.sync.wait_idle().await;

        assert!(env.producer.pushed().is_empty());
    }

    /// Wrapped-stablecoin message: recipient from metadata, pushed as the token
    #[tokio::test]
    async fn test_stablecoin_message_flow() {
        let env = env();
        let user = Address::from([0x77; 20]);
        let deposit = Deposit {
            leaf_type: LeafType::Message,
            origin_address: Address::from(USDC_CONTRACT),
            destination_address: Address::from([0x55; 20]),
            amount: U256::zero(),
            metadata: encode_bridge_metadata(&user, U256::from(25_000_000u64)),
            ..l1_deposit(4)
        };

        let mut tx = env.primary.begin();
        env.sync.process_deposit(deposit, &mut tx).await.unwrap();
        env.sync.wait_idle().await;

        let pushed = env.producer.pushed();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].dest_addr, user.to_string());
        assert_eq!(pushed[0].bridge_token, Address::from(USDC_TOKEN).to_string());
        assert_eq!(pushed[0].token_amount, "25000000");
        assert_eq!(pushed[0].leaf_type, u32::from(LeafType::Asset.as_u8()));

        let cached = &env.side_store.block_deposits()[0];
        assert_eq!(cached.destination_address, user);
        assert_eq!(cached.dest_contract_address, Address::from([0x55; 20]));
    }

    // =============================================================================
    // LARGE TRANSFERS
    // =============================================================================

    /// 10^18 raw units, 18 decimals, price 2.0, limit 1.0: write then delete
    #[tokio::test]
    async fn test_large_transfer_recorded() {
        let env = env();
        env.side_store.set_price(PriceInfo {
            chain_id: L1_CHAIN_ID,
            address: Address::from(WETH).to_string(),
            symbol: "WETH".to_string(),
            price: 2.0,
        });
        let before = Utc::now().date_naive();

        let mut tx = env.primary.begin();
        env.sync.process_deposit(l1_deposit(6), &mut tx).await.unwrap();
        env.sync.wait_idle().await;

        // The bucket day is whichever side of midnight the task ran on
        let after = Utc::now().date_naive();
        let deleted = env.side_store.deleted_keys();
        let today = [before, after]
            .into_iter()
            .find(|day| deleted == vec![expired_large_tx_key(1, *day, 2)])
            .expect("expired bucket of the processing day deleted");

        let records = env.side_store.large_transactions(&large_tx_key(1, today));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].usd_amount, 2.0);
        assert_eq!(records[0].amount, 1.0);
        assert_eq!(records[0].chain_id, L1_CHAIN_ID);
        assert_eq!(records[0].symbol, "WETH");

        let pushed = env.producer.pushed();
        assert_eq!(pushed[0].logo_info, Some(weth_info()));
    }

    #[tokio::test]
    async fn test_small_transfer_not_recorded() {
        let env = env_with(
            RecordingProducer::default(),
            SyncConfig {
                large_tx_usd_limit: 100_000.0,
                ..default_config()
            },
        );
        env.side_store.set_price(PriceInfo {
            chain_id: L1_CHAIN_ID,
            address: Address::from(WETH).to_string(),
            symbol: "WETH".to_string(),
            price: 2.0,
        });

        let mut tx = env.primary.begin();
        env.sync.process_deposit(l1_deposit(7), &mut tx).await.unwrap();
        env.sync.wait_idle().await;

        assert!(env.side_store.deleted_keys().is_empty());
        assert_eq!(env.producer.pushed().len(), 1);
    }

    // =============================================================================
    // CLAIMS
    // =============================================================================

    #[tokio::test]
    async fn test_claim_of_committed_l1_deposit() {
        let env = env();
        let mut tx = env.primary.begin();
        env.sync.process_deposit(l1_deposit(8), &mut tx).await.unwrap();
        env.primary.commit(tx).unwrap();
        env.sync.wait_idle().await;

        let claim = Claim {
            index: 8,
            mainnet_flag: true,
            network_id: 1,
            tx_hash: TxHash::from([0xee; 32]),
            time: Utc::now(),
            ..Default::default()
        };
        let mut tx = env.primary.begin();
        env.sync.process_claim(claim.clone(), &mut tx).await.unwrap();
        env.primary.commit(tx).unwrap();
        env.sync.wait_idle().await;

        let pushed = env.producer.pushed();
        assert_eq!(pushed.len(), 2);
        let claimed = &pushed[1];
        assert_eq!(claimed.status, TransferStatus::Claimed.code());
        assert_eq!(claimed.claim_tx_hash, claim.tx_hash.to_string());
        assert_eq!(claimed.index, 8);
        assert_eq!(claimed.global_index, "18446744073709551624");
        assert_eq!(env.primary.claims().len(), 1);
    }

    #[tokio::test]
    async fn test_claim_of_rollup_deposit() {
        let env = env();
        env.primary.seed_deposit(Deposit {
            network_id: 1,
            destination_network: 0,
            ..l1_deposit(3)
        });

        let claim = Claim {
            index: 3,
            mainnet_flag: false,
            rollup_index: 0,
            ..Default::default()
        };
        env.sync.after_process_claim(claim).await.unwrap();
        env.sync.wait_idle().await;

        let pushed = env.producer.pushed();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].from_chain, 1);
        assert_eq!(pushed[0].global_index, "3");
    }

    #[tokio::test]
    async fn test_claim_of_unknown_deposit_is_logged_only() {
        let env = env();
        let claim = Claim {
            index: 99,
            mainnet_flag: true,
            ..Default::default()
        };
        let mut tx = env.primary.begin();
        env.sync.process_claim(claim, &mut tx).await.unwrap();
        env.sync.wait_idle().await;

        assert!(env.producer.pushed().is_empty());
        assert_eq!(env.metrics.side_effect_failures("claim-pushed"), 1);
    }

    // =============================================================================
    // BACK-PRESSURE
    // =============================================================================

    /// A slow broker bounds the work in flight without losing notifications
    #[tokio::test]
    async fn test_slow_broker_applies_back_pressure() {
        let env = env_with(
            RecordingProducer {
                delay: Some(Duration::from_millis(5)),
                ..Default::default()
            },
            SyncConfig {
                max_in_flight_tasks: 2,
                ..default_config()
            },
        );

        let mut tx = env.primary.begin();
        for count in 10..30 {
            env.sync.process_deposit(l1_deposit(count), &mut tx).await.unwrap();
            assert!(env.sync.pool().in_flight() <= 2);
        }
        env.sync.wait_idle().await;

        assert_eq!(env.producer.pushed().len(), 20);
        assert_eq!(env.metrics.orders().len(), 20);
    }
}
