//! Stacks balance exporter.
//!
//! Periodically fetches the STX balance of a fixed set of addresses from the Hiro API and
//! republishes it as Prometheus metrics: a `balance{address, asset}` gauge holding the latest
//! successful observation and an `exceptions` counter of failed fetches.

mod config;
pub use config::{ConfigError, ExporterConfig, parse_addresses, validate_url};

mod constants;
pub use constants::*;

mod error;
pub use error::{FetchError, FetchResult};

mod fetcher;
pub use fetcher::{BalanceFetcher, HiroClient, HiroClientConfig, parse_balance};

mod logging;
pub use logging::{LogConfig, LogFormat};

mod metrics;
pub use metrics::{
    BALANCE, BalanceSink, EXCEPTIONS, LABEL_ADDRESS, LABEL_ASSET, MetricsServer, PrometheusSink,
};

mod publisher;
pub use publisher::BalancePublisher;

mod service;
pub use service::{poll_balances, run};

mod signal;
pub use signal::setup_signal_handler;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
