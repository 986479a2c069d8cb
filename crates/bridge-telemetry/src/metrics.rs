//! Prometheus metrics for the bridge synchronizer.
//!
//! All metrics follow the naming convention: `bridge_<metric>_<unit>`
//!
//! - `bridge_orders_total` - deposits processed, by network pair, leaf type and token
//! - `bridge_order_amount_total` - summed raw amounts, same labels
//! - `bridge_latest_block_number` - latest observed chain head per network
//! - `bridge_side_effect_failures_total` - failed background tasks, by task name

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

/// Labels shared by the order metrics.
pub const ORDER_LABELS: &[&str] = &[
    "from_network",
    "to_network",
    "leaf_type",
    "origin_network",
    "token",
];

lazy_static! {
    /// Registry holding every bridge metric
    pub static ref REGISTRY: Registry = Registry::new();

    /// Deposits processed
    pub static ref ORDERS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("bridge_orders_total", "Total number of bridge deposits processed"),
        ORDER_LABELS
    ).expect("metric creation failed");

    /// Summed deposit amounts in raw token units
    pub static ref ORDER_AMOUNT: CounterVec = CounterVec::new(
        Opts::new("bridge_order_amount_total", "Summed raw amount of processed deposits"),
        ORDER_LABELS
    ).expect("metric creation failed");

    /// Latest chain head per network
    pub static ref LATEST_BLOCK_NUMBER: IntGaugeVec = IntGaugeVec::new(
        Opts::new("bridge_latest_block_number", "Latest observed block number"),
        &["network"]
    ).expect("metric creation failed");

    /// Background task failures
    pub static ref SIDE_EFFECT_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("bridge_side_effect_failures_total", "Failed background side-effect tasks"),
        &["task"]
    ).expect("metric creation failed");
}

/// Handle to the registered metrics.
#[derive(Clone)]
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// Render every registered metric in the text exposition format.
    pub fn gather_text(&self) -> Result<String, TelemetryError> {
        encode_registry(&self.registry)
    }
}

/// Register all metrics with the bridge registry.
///
/// Registering twice is not an error; the second call returns a handle to the
/// same registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ORDERS_TOTAL.clone()),
        Box::new(ORDER_AMOUNT.clone()),
        Box::new(LATEST_BLOCK_NUMBER.clone()),
        Box::new(SIDE_EFFECT_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all bridge metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    encode_registry(&REGISTRY)
}

fn encode_registry(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
