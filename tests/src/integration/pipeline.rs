//! # Full Pipeline
//!
//! Wires the shipped adapters together: message push producer over the
//! in-memory transport, caching token enricher, Prometheus metrics and the
//! chain head poller.
//!
//! ```text
//! process_deposit ──→ SideEffectPool ──→ MessagePushProducer ──→ InMemoryTransport
//!                                              │
//!                                              └── PushMessage { bizCode, walletAddress, requestId, pushContent }
//!
//! ChainHeadPoller ──→ PrometheusMetrics ──→ bridge_latest_block_number
//! ```

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use primitive_types::U256;

    use bridge_sync::adapters::{
        CachingTokenEnricher, DefaultEstimateTime, InMemoryChainClient, InMemoryMetrics,
        InMemoryPrimaryStore, InMemorySideStore, InMemoryTransport, MessagePushProducer,
        PrometheusMetrics, PushMessage, StaticTokenSource, BIZ_CODE_BRIDGE_ORDER,
    };
    use bridge_sync::domain::{TokenInfo, TokenKey};
    use bridge_sync::ports::{BridgeEventSink, BrokerProducer, MetricsSink};
    use bridge_sync::{
        Address, BrokerConfig, ChainEventSynchronizer, Claim, Collaborators, Deposit, LeafType,
        SyncConfig, TokenRegistry, TransferNotification, TransferStatus, TxHash,
    };

    const TOKEN: [u8; 20] = [0x42; 20];

    type Producer = MessagePushProducer<InMemoryTransport>;

    fn build(
        metrics: Arc<dyn MetricsSink>,
        config: SyncConfig,
    ) -> (
        ChainEventSynchronizer<InMemoryPrimaryStore>,
        Arc<InMemoryPrimaryStore>,
        Arc<Producer>,
    ) {
        let primary = Arc::new(InMemoryPrimaryStore::new());
        let side_store = Arc::new(InMemorySideStore::new());
        side_store.set_avg_commit_duration(Some(20));
        let producer = Arc::new(MessagePushProducer::new(
            InMemoryTransport::new(),
            &BrokerConfig {
                topic: "bridge-status".to_string(),
                push_key: "bridge".to_string(),
            },
        ));
        let source = StaticTokenSource::new().with_token(
            TokenKey::new(&Address::from(TOKEN).to_string(), 196),
            TokenInfo {
                logo_url: "https://logo/okb".to_string(),
                symbol: "OKB".to_string(),
                decimals: 18,
            },
        );

        let estimator = Arc::new(DefaultEstimateTime::from_config(&config, side_store.clone()));
        let sync = ChainEventSynchronizer::new(
            config,
            TokenRegistry::default(),
            Collaborators {
                primary: primary.clone(),
                side_store: side_store.clone(),
                producer: Some(producer.clone() as Arc<dyn BrokerProducer>),
                estimator,
                enricher: Arc::new(CachingTokenEnricher::new(source)),
                metrics,
            },
        )
        .unwrap();
        (sync, primary, producer)
    }

    fn config() -> SyncConfig {
        SyncConfig {
            network_id: 1,
            rollup_id: 1,
            home_network_id: 1,
            chain_ids: HashMap::from([(0, 1), (1, 196)]),
            ..Default::default()
        }
    }

    fn rollup_deposit() -> Deposit {
        Deposit {
            leaf_type: LeafType::Asset,
            origin_network: 1,
            origin_address: Address::from(TOKEN),
            amount: U256::from(3u64) * U256::exp10(18),
            network_id: 1,
            destination_network: 0,
            destination_address: Address::from([0x09; 20]),
            deposit_count: 11,
            block_number: 77,
            tx_hash: TxHash::from([0x0b; 32]),
            time: Utc::now(),
            ..Default::default()
        }
    }

    fn decode(value: &str) -> (PushMessage, TransferNotification) {
        let message: PushMessage = serde_json::from_str(value).unwrap();
        let content = serde_json::from_str(&message.push_content).unwrap();
        (message, content)
    }

    /// Deposit and claim through the inbound port, delivered as push envelopes
    #[tokio::test]
    async fn test_deposit_and_claim_reach_transport() {
        let (sync, primary, producer) = build(Arc::new(InMemoryMetrics::default()), config());
        let mut tx = primary.begin();
        let id = BridgeEventSink::process_deposit(&sync, rollup_deposit(), &mut tx)
            .await
            .unwrap();
        primary.commit(tx).unwrap();
        sync.wait_idle().await;

        let claim = Claim {
            index: 11,
            mainnet_flag: false,
            rollup_index: 0,
            network_id: 0,
            tx_hash: TxHash::from([0x0c; 32]),
            time: Utc::now(),
            ..Default::default()
        };
        let mut tx = primary.begin();
        BridgeEventSink::process_claim(&sync, claim, &mut tx)
            .await
            .unwrap();
        primary.commit(tx).unwrap();
        sync.wait_idle().await;

        let records = producer.transport().records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.topic == "bridge-status"));
        assert!(records.iter().all(|r| r.key.as_deref() == Some("bridge")));

        let (message, created) = decode(&records[0].value);
        assert_eq!(message.biz_code, BIZ_CODE_BRIDGE_ORDER);
        assert_eq!(message.wallet_address, Address::from([0x09; 20]).to_string());
        assert_eq!(created.status, TransferStatus::Created.code());
        assert_eq!(created.id, id);
        assert_eq!(created.estimate_time, 20);
        assert_eq!(created.from_chain_id, 196);
        assert_eq!(created.to_chain_id, 1);
        assert_eq!(created.global_index, "11");
        assert_eq!(created.logo_info.map(|t| t.symbol), Some("OKB".to_string()));

        let (_, claimed) = decode(&records[1].value);
        assert_eq!(claimed.status, TransferStatus::Claimed.code());
        assert_eq!(claimed.global_index, "11");

        producer.close().await.unwrap();
        assert!(producer.transport().is_closed());
    }

    /// Transport outage never reaches the caller
    #[tokio::test]
    async fn test_transport_outage_is_tolerated() {
        let (sync, primary, producer) = build(Arc::new(InMemoryMetrics::default()), config());
        producer.transport().fail_sends(true);

        let mut tx = primary.begin();
        sync.process_deposit(rollup_deposit(), &mut tx).await.unwrap();
        sync.wait_idle().await;

        assert!(producer.transport().records().is_empty());
    }

    /// Orders and chain heads land in the Prometheus registry
    #[tokio::test]
    async fn test_prometheus_export() {
        let handle = bridge_telemetry::register_metrics().unwrap();
        let (sync, primary, _producer) = build(Arc::new(PrometheusMetrics::new()), config());

        let mut tx = primary.begin();
        sync.process_deposit(rollup_deposit(), &mut tx).await.unwrap();
        sync.wait_idle().await;

        let client = Arc::new(InMemoryChainClient::new(4242));
        let poller = sync.spawn_head_poller(client.clone());
        while client.calls() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        sync.shutdown().await;
        poller.await.unwrap();

        let text = handle.gather_text().unwrap();
        assert!(text.contains("bridge_orders_total"));
        assert!(text.contains("bridge_latest_block_number"));
        assert!(text.contains("4242"));
    }

    /// The head poller keeps going through RPC errors and stops on shutdown
    #[tokio::test(start_paused = true)]
    async fn test_head_poller_lifecycle() {
        let metrics = Arc::new(InMemoryMetrics::default());
        let (sync, _primary, _producer) = build(metrics.clone(), config());
        let client = Arc::new(InMemoryChainClient::new(100));
        client.set_failing(true);

        let poller = sync.spawn_head_poller(client.clone());
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(client.calls(), 2);
        assert_eq!(metrics.latest_height(1), None);

        client.set_failing(false);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(metrics.latest_height(1), Some(100));

        sync.shutdown().await;
        poller.await.unwrap();
        let calls = client.calls();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(client.calls(), calls);
    }
}
