//! # Adapters
//!
//! Concrete implementations of the outbound ports.

mod chain_client;
mod estimate_time;
mod message_push;
mod metrics;
mod primary_store;
mod side_store;
mod token_metadata;

pub use chain_client::InMemoryChainClient;
pub use estimate_time::DefaultEstimateTime;
pub use message_push::{
    Delivery, InMemoryTransport, MessagePushProducer, MessageTransport, Payload, ProduceOptions,
    ProducerRecord, PushMessage, BIZ_CODE_BRIDGE_ORDER,
};
pub use metrics::{InMemoryMetrics, NoopMetrics, PrometheusMetrics};
pub use primary_store::{InMemoryPrimaryStore, InMemoryTx};
pub use side_store::InMemorySideStore;
pub use token_metadata::{CachingTokenEnricher, StaticTokenSource};
