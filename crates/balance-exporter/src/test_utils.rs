//! In-memory doubles for the fetcher, the sink and the log output.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Layer, layer::Context};

use crate::{BalanceFetcher, BalanceSink, FetchError, FetchResult};

/// [`BalanceFetcher`] answering from per-address scripts.
///
/// Each address replays its queued results in order; the last one is sticky so that
/// repeated passes keep seeing it.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<FetchResult<u128>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    /// Creates a fetcher with no scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `result` for `address`.
    pub fn with(self, address: &str, result: FetchResult<u128>) -> Self {
        self.scripts.lock().unwrap().entry(address.to_string()).or_default().push_back(result);
        self
    }

    /// Addresses fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BalanceFetcher for ScriptedFetcher {
    async fn fetch_balance(&self, address: &str) -> FetchResult<u128> {
        self.calls.lock().unwrap().push(address.to_string());

        let mut scripts = self.scripts.lock().unwrap();
        let Some(script) = scripts.get_mut(address) else {
            return Err(FetchError::Unknown(format!("no script for {address}")));
        };
        match script.len() {
            0 => Err(FetchError::Unknown(format!("no script for {address}"))),
            1 => script[0].clone(),
            _ => script.pop_front().expect("script has at least two entries"),
        }
    }
}

/// [`BalanceSink`] keeping gauges and the failure counter in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    gauges: Mutex<HashMap<(String, String), u128>>,
    failures: AtomicU64,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current gauge value of `(address, asset)`, `None` if never observed.
    pub fn balance(&self, address: &str, asset: &str) -> Option<u128> {
        self.gauges.lock().unwrap().get(&(address.to_string(), asset.to_string())).copied()
    }

    /// Number of distinct gauge series.
    pub fn series(&self) -> usize {
        self.gauges.lock().unwrap().len()
    }

    /// Current failure counter value.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl BalanceSink for RecordingSink {
    fn record_balance(&self, address: &str, asset: &str, balance: u128) {
        self.gauges.lock().unwrap().insert((address.to_string(), asset.to_string()), balance);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// A captured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level.
    pub level: Level,
    /// Rendered `message` field.
    pub message: String,
    /// Rendered `address` field, if any.
    pub address: Option<String>,
}

/// Tracing layer recording every event it sees.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Creates an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events captured so far.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Number of captured events at `level`.
    pub fn count(&self, level: Level) -> usize {
        self.events.lock().unwrap().iter().filter(|e| e.level == level).count()
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    address: Option<String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "address" => self.address = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "address" => self.address = Some(format!("{value:?}")),
            _ => {}
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            address: visitor.address,
        });
    }
}
