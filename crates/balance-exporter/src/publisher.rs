//! Single-pass balance publishing.

use tracing::{debug, error};

use crate::{BalanceFetcher, BalanceSink, FetchError, STX_ASSET};

/// Fetches balances for a list of addresses and publishes them into a [`BalanceSink`].
///
/// Holds no state between passes; everything observable lives in the sink.
#[derive(Debug)]
pub struct BalancePublisher<F, S> {
    fetcher: F,
    sink: S,
    asset: String,
}

impl<F: BalanceFetcher, S: BalanceSink> BalancePublisher<F, S> {
    /// Creates a publisher labelling balances with [`STX_ASSET`].
    pub fn new(fetcher: F, sink: S) -> Self {
        Self { fetcher, sink, asset: STX_ASSET.to_string() }
    }

    /// Sets the asset label.
    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        self.asset = asset.into();
        self
    }

    /// Returns the fetcher.
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the asset label.
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Runs one pass over `addresses`, in order.
    ///
    /// A successful fetch overwrites the `(address, asset)` gauge. A failed fetch leaves it
    /// untouched and counts one failure. Failures never stop the pass.
    pub async fn publish_pass(&self, addresses: &[String]) {
        for address in addresses {
            let err = match self.fetcher.fetch_balance(address).await {
                Ok(balance) => {
                    self.sink.record_balance(address, &self.asset, balance);
                    debug!(%address, %balance, asset = %self.asset, "balance updated");
                    continue;
                }
                Err(err) => err,
            };

            match &err {
                FetchError::Connection(detail) => {
                    error!(%address, error = %detail, "Error while connecting to balance API");
                }
                FetchError::HttpStatus { .. } | FetchError::MalformedResponse(_) => {
                    error!(%address, error = %err, "Error while retrieving data from balance API");
                }
                FetchError::Unknown(_) => {
                    error!(%address, error = %err, "Error for address");
                }
            }
            self.sink.record_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::test_utils::{LogCapture, RecordingSink, ScriptedFetcher};

    const SP1: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";
    const SP2: &str = "SP3FBR2AGK5H9QBDH3EEN6DF8EK8JY7RX8QJ5SVTE";
    const SP3: &str = "SP000000000000000000002Q6VF78";

    fn addresses(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    fn connection() -> FetchError {
        FetchError::Connection("tcp connect error: Connection refused".into())
    }

    #[tokio::test]
    async fn test_mixed_pass_updates_successes_and_counts_failures() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

        let fetcher = ScriptedFetcher::new().with(SP1, Ok(1_500_000)).with(SP2, Err(connection()));
        let publisher = BalancePublisher::new(fetcher, RecordingSink::new());

        publisher.publish_pass(&addresses(&[SP1, SP2])).await;

        let sink = publisher.sink();
        assert_eq!(sink.balance(SP1, "uSTX"), Some(1_500_000));
        assert_eq!(sink.balance(SP2, "uSTX"), None);
        assert_eq!(sink.failures(), 1);

        assert_eq!(capture.events().len(), 2);
        assert_eq!(capture.count(Level::DEBUG), 1);
        assert_eq!(capture.count(Level::ERROR), 1);
        let error = capture.events().into_iter().find(|e| e.level == Level::ERROR).unwrap();
        assert_eq!(error.address.as_deref(), Some(SP2));
        assert_eq!(error.message, "Error while connecting to balance API");
    }

    #[tokio::test]
    async fn test_addresses_processed_in_order() {
        let fetcher = ScriptedFetcher::new()
            .with(SP3, Ok(3))
            .with(SP1, Err(FetchError::Unknown("boom".into())))
            .with(SP2, Ok(2));
        let publisher = BalancePublisher::new(fetcher, RecordingSink::new());

        publisher.publish_pass(&addresses(&[SP3, SP1, SP2])).await;

        assert_eq!(publisher.fetcher().calls(), addresses(&[SP3, SP1, SP2]));
        assert_eq!(publisher.sink().balance(SP2, "uSTX"), Some(2));
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_value_and_continues() {
        let fetcher = ScriptedFetcher::new()
            .with(SP1, Ok(100))
            .with(SP1, Err(FetchError::HttpStatus { status: 500, body: "oops".into() }))
            .with(SP2, Ok(7));
        let publisher = BalancePublisher::new(fetcher, RecordingSink::new());
        let list = addresses(&[SP1, SP2]);

        publisher.publish_pass(&list).await;
        assert_eq!(publisher.sink().balance(SP1, "uSTX"), Some(100));
        assert_eq!(publisher.sink().failures(), 0);

        publisher.publish_pass(&list).await;
        // Stale but present.
        assert_eq!(publisher.sink().balance(SP1, "uSTX"), Some(100));
        assert_eq!(publisher.sink().balance(SP2, "uSTX"), Some(7));
        assert_eq!(publisher.sink().failures(), 1);
    }

    #[tokio::test]
    async fn test_identical_passes_are_idempotent() {
        let fetcher = ScriptedFetcher::new().with(SP1, Ok(42)).with(SP2, Ok(43));
        let publisher = BalancePublisher::new(fetcher, RecordingSink::new());
        let list = addresses(&[SP1, SP2]);

        publisher.publish_pass(&list).await;
        publisher.publish_pass(&list).await;
        publisher.publish_pass(&list).await;

        assert_eq!(publisher.sink().balance(SP1, "uSTX"), Some(42));
        assert_eq!(publisher.sink().balance(SP2, "uSTX"), Some(43));
        assert_eq!(publisher.sink().series(), 2);
        assert_eq!(publisher.sink().failures(), 0);
    }

    #[tokio::test]
    async fn test_each_error_kind_counts_once_without_gauge_update() {
        let cases = [
            (connection(), "Error while connecting to balance API"),
            (
                FetchError::HttpStatus { status: 500, body: "internal".into() },
                "Error while retrieving data from balance API",
            ),
            (
                FetchError::MalformedResponse("missing `balance` field".into()),
                "Error while retrieving data from balance API",
            ),
            (FetchError::Unknown("unexpected response shape".into()), "Error for address"),
        ];

        for (err, expected_message) in cases {
            let capture = LogCapture::new();
            let _guard =
                tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

            let fetcher = ScriptedFetcher::new().with(SP1, Err(err.clone()));
            let publisher = BalancePublisher::new(fetcher, RecordingSink::new());
            publisher.publish_pass(&addresses(&[SP1])).await;

            assert_eq!(publisher.sink().failures(), 1, "{err:?}");
            assert_eq!(publisher.sink().series(), 0, "{err:?}");

            let events = capture.events();
            assert_eq!(events.len(), 1, "{err:?}");
            assert_eq!(events[0].level, Level::ERROR);
            assert_eq!(events[0].message, expected_message);
        }
    }

    #[tokio::test]
    async fn test_failures_accumulate_across_passes() {
        let fetcher = ScriptedFetcher::new()
            .with(SP1, Ok(1))
            .with(SP2, Err(connection()))
            .with(SP3, Err(FetchError::MalformedResponse("bad".into())));
        let publisher = BalancePublisher::new(fetcher, RecordingSink::new());
        let list = addresses(&[SP1, SP2, SP3]);

        let passes = 5;
        for _ in 0..passes {
            publisher.publish_pass(&list).await;
        }

        assert_eq!(publisher.sink().failures(), passes * 2);
        assert_eq!(publisher.sink().balance(SP1, "uSTX"), Some(1));
    }

    #[tokio::test]
    async fn test_duplicate_addresses_last_occurrence_wins() {
        let fetcher = ScriptedFetcher::new().with(SP1, Ok(10)).with(SP1, Ok(20));
        let publisher = BalancePublisher::new(fetcher, RecordingSink::new());

        publisher.publish_pass(&addresses(&[SP1, SP1])).await;

        assert_eq!(publisher.fetcher().calls().len(), 2);
        assert_eq!(publisher.sink().balance(SP1, "uSTX"), Some(20));
        assert_eq!(publisher.sink().series(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_address_failing_last_keeps_earlier_value() {
        let fetcher = ScriptedFetcher::new().with(SP1, Ok(10)).with(SP1, Err(connection()));
        let publisher = BalancePublisher::new(fetcher, RecordingSink::new());

        publisher.publish_pass(&addresses(&[SP1, SP1])).await;

        assert_eq!(publisher.sink().balance(SP1, "uSTX"), Some(10));
        assert_eq!(publisher.sink().failures(), 1);
    }

    #[tokio::test]
    async fn test_custom_asset_label() {
        let fetcher = ScriptedFetcher::new().with(SP1, Ok(5));
        let publisher = BalancePublisher::new(fetcher, RecordingSink::new()).with_asset("uSTX-test");

        publisher.publish_pass(&addresses(&[SP1])).await;

        assert_eq!(publisher.asset(), "uSTX-test");
        assert_eq!(publisher.sink().balance(SP1, "uSTX-test"), Some(5));
        assert_eq!(publisher.sink().balance(SP1, "uSTX"), None);
    }

    #[tokio::test]
    async fn test_empty_pass_is_a_noop() {
        let publisher = BalancePublisher::new(ScriptedFetcher::new(), RecordingSink::new());
        publisher.publish_pass(&[]).await;
        assert!(publisher.fetcher().calls().is_empty());
        assert_eq!(publisher.sink().failures(), 0);
    }
}
