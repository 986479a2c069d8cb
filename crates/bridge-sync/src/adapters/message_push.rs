//! Message push producer.
//!
//! Wraps transfer-status notifications into the push envelope consumed by the
//! wallet notification service and hands them to a [`MessageTransport`].
//! Connection, TLS and SASL handling live in the transport implementation.

use crate::config::BrokerConfig;
use crate::domain::TransferNotification;
use crate::error::{SyncError, SyncResult};
use crate::ports::BrokerProducer;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tracing::{debug, info};
use uuid::Uuid;

/// Business code of bridge order pushes.
pub const BIZ_CODE_BRIDGE_ORDER: &str = "bridge_order";

/// Envelope expected by the push service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub biz_code: String,
    pub wallet_address: String,
    pub request_id: String,
    pub push_content: String,
}

/// Outbound payload.
#[derive(Clone, Debug)]
pub enum Payload<T> {
    /// Sent as is.
    RawText(String),
    /// JSON encoded before sending.
    Structured(T),
}

impl<T: Serialize> Payload<T> {
    pub fn encode(&self) -> SyncResult<String> {
        match self {
            Payload::RawText(text) => Ok(text.clone()),
            Payload::Structured(value) => Ok(serde_json::to_string(value)?),
        }
    }
}

/// Per-message produce options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProduceOptions {
    pub topic: String,
    pub push_key: String,
}

impl ProduceOptions {
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_push_key(mut self, push_key: impl Into<String>) -> Self {
        self.push_key = push_key.into();
        self
    }
}

/// A record as handed to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProducerRecord {
    pub topic: String,
    pub key: Option<String>,
    pub value: String,
}

/// Where a record landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub partition: i32,
    pub offset: i64,
}

/// Broker connection below the producer.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Send one record synchronously.
    async fn send(&self, record: ProducerRecord) -> SyncResult<Delivery>;

    /// Flush and release the connection.
    async fn close(&self) -> SyncResult<()>;
}

/// Producer publishing notifications through a transport.
pub struct MessagePushProducer<T: MessageTransport> {
    transport: T,
    defaults: ProduceOptions,
}

impl<T: MessageTransport> MessagePushProducer<T> {
    pub fn new(transport: T, config: &BrokerConfig) -> Self {
        Self {
            transport,
            defaults: ProduceOptions {
                topic: config.topic.clone(),
                push_key: config.push_key.clone(),
            },
        }
    }

    /// Default options taken from the broker configuration.
    pub fn options(&self) -> ProduceOptions {
        self.defaults.clone()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Produce a payload.
    pub async fn produce<P: Serialize>(
        &self,
        payload: Payload<P>,
        options: ProduceOptions,
    ) -> SyncResult<Delivery> {
        let value = payload.encode()?;
        let key = (!options.push_key.is_empty()).then_some(options.push_key);
        let delivery = self
            .transport
            .send(ProducerRecord {
                topic: options.topic.clone(),
                key,
                value,
            })
            .await?;
        debug!(
            topic = %options.topic,
            partition = delivery.partition,
            offset = delivery.offset,
            "[bridge-sync] message produced"
        );
        Ok(delivery)
    }

    /// Push a status change with explicit options.
    pub async fn push_transaction_update_with(
        &self,
        notification: &TransferNotification,
        options: ProduceOptions,
    ) -> SyncResult<Delivery> {
        let content = serde_json::to_string(notification)?;
        let message = PushMessage {
            biz_code: BIZ_CODE_BRIDGE_ORDER.to_string(),
            wallet_address: notification.dest_addr.clone(),
            request_id: Uuid::new_v4().to_string(),
            push_content: content,
        };
        let delivery = self.produce(Payload::Structured(message), options).await?;
        info!(
            tx_hash = %notification.tx_hash,
            status = notification.status,
            partition = delivery.partition,
            offset = delivery.offset,
            "[bridge-sync] transfer status pushed"
        );
        Ok(delivery)
    }

    pub async fn close(&self) -> SyncResult<()> {
        self.transport.close().await
    }
}

#[async_trait]
impl<T: MessageTransport> BrokerProducer for MessagePushProducer<T> {
    async fn push_transaction_update(
        &self,
        notification: &TransferNotification,
    ) -> SyncResult<()> {
        self.push_transaction_update_with(notification, self.options())
            .await
            .map(|_| ())
    }
}

/// Transport recording every record in memory.
#[derive(Default)]
pub struct InMemoryTransport {
    records: Mutex<Vec<ProducerRecord>>,
    next_offset: AtomicI64,
    fail: AtomicBool,
    closed: AtomicBool,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `send` fail.
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<ProducerRecord> {
        self.records.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageTransport for InMemoryTransport {
    async fn send(&self, record: ProducerRecord) -> SyncResult<Delivery> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SyncError::Broker {
                reason: "producer closed".to_string(),
            });
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(SyncError::Broker {
                reason: format!("send to {} failed", record.topic),
            });
        }
        self.records.lock().push(record);
        Ok(Delivery {
            partition: 0,
            offset: self.next_offset.fetch_add(1, Ordering::SeqCst),
        })
    }

    async fn close(&self) -> SyncResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
