//! Metric names, the balance sink and the Prometheus exposition server.

use std::{
    net::SocketAddr,
    thread::{self, sleep},
    time::Duration,
};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use metrics_process::Collector;
use tracing::info;

/// Gauge: latest observed balance, labelled with `address` and `asset`.
pub const BALANCE: &str = "balance";

/// Counter: total number of failed balance fetches.
pub const EXCEPTIONS: &str = "exceptions";

/// Label key for the address.
pub const LABEL_ADDRESS: &str = "address";

/// Label key for the asset.
pub const LABEL_ASSET: &str = "asset";

/// Destination of balance samples and fetch failures.
pub trait BalanceSink: Send + Sync {
    /// Overwrites the balance of the `(address, asset)` series.
    fn record_balance(&self, address: &str, asset: &str, balance: u128);

    /// Counts one failed fetch.
    fn record_failure(&self);
}

/// [`BalanceSink`] writing through the global `metrics` recorder.
#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

impl PrometheusSink {
    /// Creates the sink and registers the metric descriptions.
    pub fn new() -> Self {
        metrics::describe_gauge!(BALANCE, "Balance");
        metrics::describe_counter!(EXCEPTIONS, "Exceptions");
        Self
    }
}

impl Default for PrometheusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceSink for PrometheusSink {
    fn record_balance(&self, address: &str, asset: &str, balance: u128) {
        // Gauges are f64; precision loss only starts above 2^53 base units.
        metrics::gauge!(
            BALANCE,
            LABEL_ADDRESS => address.to_string(),
            LABEL_ASSET => asset.to_string()
        )
        .set(balance as f64);
    }

    fn record_failure(&self) {
        metrics::counter!(EXCEPTIONS).increment(1);
    }
}

/// Scrape endpoint exposing the `balance` gauge, the `exceptions` counter and process
/// metrics in the Prometheus text format.
#[derive(Debug, Clone, Copy)]
pub struct MetricsServer;

impl MetricsServer {
    /// Installs the global recorder that [`PrometheusSink`] writes to and starts answering
    /// scrapes on `addr`.
    ///
    /// CPU, memory and file descriptor gauges are sampled every `process_interval` so scrapes
    /// between two passes still see fresh process state.
    pub fn init(addr: SocketAddr, process_interval: Duration) -> Result<(), BuildError> {
        PrometheusBuilder::new().with_http_listener(addr).install()?;

        let collector = Collector::default();
        collector.describe();

        thread::spawn(move || {
            loop {
                collector.collect();
                sleep(process_interval);
            }
        });

        info!(target: "prometheus", port = addr.port(), %addr, "Listening on port");

        Ok(())
    }
}
