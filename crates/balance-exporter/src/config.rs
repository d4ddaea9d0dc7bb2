//! Configuration types and validation for the exporter.

use std::{net::SocketAddr, time::Duration};

use thiserror::Error;
use url::Url;

use crate::{
    DEFAULT_METRICS_HOST, DEFAULT_METRICS_PORT, DEFAULT_PROCESS_METRICS_INTERVAL,
    DEFAULT_SCRAPING_INTERVAL, HiroClientConfig,
};

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No address to track.
    #[error("Please specify at least one address to track in ADDRESSES.")]
    NoAddresses,
    /// Invalid URL format.
    #[error("invalid {field} URL: {reason}")]
    InvalidUrl {
        /// The field name that contains the invalid URL.
        field: &'static str,
        /// The reason the URL is invalid.
        reason: String,
    },
    /// A field value is out of the allowed range.
    #[error("{field} must be {constraint}, got {value}")]
    OutOfRange {
        /// The field name that is out of range.
        field: &'static str,
        /// The constraint description.
        constraint: &'static str,
        /// The actual value.
        value: String,
    },
}

/// Validated exporter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Addresses to track, in pass order. Duplicates are kept.
    pub addresses: Vec<String>,
    /// Pause between two passes.
    pub scraping_interval: Duration,
    /// Bind address of the Prometheus exposition endpoint.
    pub metrics_addr: SocketAddr,
    /// Refresh interval of the process metrics.
    pub process_metrics_interval: Duration,
    /// Balance API client configuration.
    pub api: HiroClientConfig,
}

impl ExporterConfig {
    /// Creates a configuration with defaults for everything but the addresses and the API.
    pub fn new(addresses: Vec<String>, api: HiroClientConfig) -> Self {
        Self {
            addresses,
            scraping_interval: DEFAULT_SCRAPING_INTERVAL,
            metrics_addr: SocketAddr::new(DEFAULT_METRICS_HOST, DEFAULT_METRICS_PORT),
            process_metrics_interval: DEFAULT_PROCESS_METRICS_INTERVAL,
            api,
        }
    }

    /// Sets the pause between two passes.
    pub const fn with_scraping_interval(mut self, interval: Duration) -> Self {
        self.scraping_interval = interval;
        self
    }

    /// Sets the bind address of the exposition endpoint.
    pub const fn with_metrics_addr(mut self, addr: SocketAddr) -> Self {
        self.metrics_addr = addr;
        self
    }

    /// Checks the invariants the service relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addresses.is_empty() {
            return Err(ConfigError::NoAddresses);
        }

        if self.scraping_interval.is_zero() {
            return Err(ConfigError::OutOfRange {
                field: "scraping_interval",
                constraint: "greater than 0",
                value: format!("{:?}", self.scraping_interval),
            });
        }

        if self.process_metrics_interval.is_zero() {
            return Err(ConfigError::OutOfRange {
                field: "process_metrics_interval",
                constraint: "greater than 0",
                value: format!("{:?}", self.process_metrics_interval),
            });
        }

        validate_url(&self.api.base_url, "api")
    }
}

/// Splits a comma-separated address list.
///
/// Entries are trimmed and empty entries dropped. Order and duplicates are preserved.
pub fn parse_addresses(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|a| !a.is_empty()).map(str::to_string).collect()
}

/// Validate that a URL has an http(s) scheme and a host.
pub fn validate_url(url: &Url, field: &'static str) -> Result<(), ConfigError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            field,
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }

    if url.host().is_none() {
        return Err(ConfigError::InvalidUrl { field, reason: "missing host".to_string() });
    }

    Ok(())
}
