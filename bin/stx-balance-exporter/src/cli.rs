//! Command line arguments.

use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use balance_exporter::{
    DEFAULT_API_URL, DEFAULT_METRICS_HOST, DEFAULT_METRICS_PORT, ExporterConfig,
    HiroClientConfig, LogConfig, LogFormat, parse_addresses,
};
use clap::{ArgAction, Parser, builder::FalseyValueParser};
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Exports Stacks address balances as Prometheus metrics")]
pub(crate) struct Args {
    /// Comma-separated list of addresses to track
    #[arg(long, env = "ADDRESSES", default_value = "")]
    pub addresses: String,

    /// Pause between two passes over the addresses, in seconds
    #[arg(long, env = "SCRAPING_INTERVAL", default_value_t = 120)]
    pub scraping_interval: u64,

    /// Host to serve the metrics on
    #[arg(long, env = "METRICS_HOST", default_value_t = DEFAULT_METRICS_HOST)]
    pub metrics_host: IpAddr,

    /// Port to serve the metrics on
    #[arg(long, env = "METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Base URL of the balance API
    #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: Url,

    /// Balance request timeout in seconds, unset keeps the HTTP client default
    #[arg(long, env = "REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Log at debug level, any non-empty value other than a falsey one enables it
    #[arg(
        long,
        env = "DEBUG",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = FalseyValueParser::new()
    )]
    pub debug: bool,

    /// Log format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Full)]
    pub log_format: LogFormat,
}

impl Args {
    pub(crate) const fn log_config(&self) -> LogConfig {
        LogConfig::from_debug_flag(self.debug, self.log_format)
    }
}

impl From<Args> for ExporterConfig {
    fn from(args: Args) -> Self {
        let api = HiroClientConfig::new(args.api_url)
            .with_timeout(args.request_timeout.map(Duration::from_secs));

        Self::new(parse_addresses(&args.addresses), api)
            .with_scraping_interval(Duration::from_secs(args.scraping_interval))
            .with_metrics_addr(SocketAddr::new(args.metrics_host, args.metrics_port))
    }
}
