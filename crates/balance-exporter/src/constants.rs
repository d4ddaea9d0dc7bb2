//! Constants used throughout the exporter.

use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

/// Asset label attached to every published balance. Balances are reported in micro-STX.
pub const STX_ASSET: &str = "uSTX";

/// Base of the Hiro extended API. Balances are read from `{base}/address/{address}/stx`.
pub const DEFAULT_API_URL: &str = "https://api.hiro.so/extended/v1";

/// `User-Agent` sent with every balance request.
pub const USER_AGENT: &str = "stacks_balance_to_prometheus/1.0";

/// Default pause between two passes over the address list.
pub const DEFAULT_SCRAPING_INTERVAL: Duration = Duration::from_secs(120);

/// Default port of the Prometheus exposition endpoint.
pub const DEFAULT_METRICS_PORT: u16 = 8081;

/// Default bind address of the Prometheus exposition endpoint.
pub const DEFAULT_METRICS_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// How often process metrics (CPU, memory, open fds) are refreshed.
pub const DEFAULT_PROCESS_METRICS_INTERVAL: Duration = Duration::from_secs(5);
