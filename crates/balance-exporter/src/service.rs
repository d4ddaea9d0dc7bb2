//! Exporter service lifecycle.

use std::time::Duration;

use eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    BalanceFetcher, BalancePublisher, BalanceSink, ExporterConfig, HiroClient, MetricsServer,
    PrometheusSink, setup_signal_handler,
};

/// Runs passes over `addresses` until `cancel` fires.
///
/// The first pass starts immediately, each following one `interval` after the previous one
/// completed. Cancellation is observed between passes, never in the middle of one.
pub async fn poll_balances<F, S>(
    publisher: &BalancePublisher<F, S>,
    addresses: &[String],
    interval: Duration,
    cancel: CancellationToken,
) where
    F: BalanceFetcher,
    S: BalanceSink,
{
    while !cancel.is_cancelled() {
        publisher.publish_pass(addresses).await;

        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }
}

/// Runs the exporter until SIGINT or SIGTERM.
///
/// Steps:
/// 1. Install the signal handler
/// 2. Start the Prometheus exposition endpoint and the process collector
/// 3. Build the API client and the publisher
/// 4. Poll until cancelled
pub async fn run(config: ExporterConfig) -> Result<()> {
    config.validate()?;

    let cancel = CancellationToken::new();
    setup_signal_handler(cancel.clone());

    MetricsServer::init(config.metrics_addr, config.process_metrics_interval)?;

    let client = HiroClient::new(config.api.clone())?;
    let publisher = BalancePublisher::new(client, PrometheusSink::new());

    info!(
        addresses = config.addresses.len(),
        interval = ?config.scraping_interval,
        api = %config.api.base_url,
        "Balance exporter starting"
    );

    poll_balances(&publisher, &config.addresses, config.scraping_interval, cancel).await;

    info!("Balance exporter stopped");
    Ok(())
}
