//! Metrics adapters.
//!
//! `PrometheusMetrics` feeds the process-wide registry exported by
//! `bridge-telemetry`; `InMemoryMetrics` records samples for assertions.

use crate::domain::{NetworkId, OrderMetric};
use crate::ports::MetricsSink;
use bridge_telemetry::metrics::{
    LATEST_BLOCK_NUMBER, ORDERS_TOTAL, ORDER_AMOUNT, SIDE_EFFECT_FAILURES,
};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::algorithms::u256_to_f64;

/// Prometheus-backed metrics sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrometheusMetrics;

impl PrometheusMetrics {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for PrometheusMetrics {
    fn record_order(&self, order: &OrderMetric) {
        let from = order.from_network.to_string();
        let to = order.to_network.to_string();
        let leaf = order.leaf_type.to_string();
        let origin = order.origin_network.to_string();
        let token = order.token.to_string();
        let labels = [
            from.as_str(),
            to.as_str(),
            leaf.as_str(),
            origin.as_str(),
            token.as_str(),
        ];
        ORDERS_TOTAL.with_label_values(&labels).inc();
        ORDER_AMOUNT
            .with_label_values(&labels)
            .inc_by(u256_to_f64(order.amount));
    }

    fn record_latest_block_num(&self, network_id: NetworkId, height: u64) {
        LATEST_BLOCK_NUMBER
            .with_label_values(&[&network_id.to_string()])
            .set(i64::try_from(height).unwrap_or(i64::MAX));
    }

    fn record_side_effect_failure(&self, task: &str) {
        SIDE_EFFECT_FAILURES.with_label_values(&[task]).inc();
    }
}

/// Metrics sink discarding every sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_order(&self, _order: &OrderMetric) {}

    fn record_latest_block_num(&self, _network_id: NetworkId, _height: u64) {}

    fn record_side_effect_failure(&self, _task: &str) {}
}

/// Metrics sink keeping every sample in memory.
#[derive(Default)]
pub struct InMemoryMetrics {
    orders: Mutex<Vec<OrderMetric>>,
    heights: Mutex<HashMap<NetworkId, u64>>,
    failures: Mutex<HashMap<String, usize>>,
}

impl InMemoryMetrics {
    pub fn orders(&self) -> Vec<OrderMetric> {
        self.orders.lock().clone()
    }

    pub fn latest_height(&self, network_id: NetworkId) -> Option<u64> {
        self.heights.lock().get(&network_id).copied()
    }

    pub fn side_effect_failures(&self, task: &str) -> usize {
        self.failures.lock().get(task).copied().unwrap_or(0)
    }
}

impl MetricsSink for InMemoryMetrics {
    fn record_order(&self, order: &OrderMetric) {
        self.orders.lock().push(order.clone());
    }

    fn record_latest_block_num(&self, network_id: NetworkId, height: u64) {
        self.heights.lock().insert(network_id, height);
    }

    fn record_side_effect_failure(&self, task: &str) {
        *self.failures.lock().entry(task.to_string()).or_default() += 1;
    }
}
