//! Tracing subscriber configuration.

use std::io;

use clap::ValueEnum;
use tracing::{Subscriber, level_filters::LevelFilter};
use tracing_subscriber::{
    EnvFilter, Layer, fmt::time::SystemTime, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Full format with timestamp, level and target.
    #[default]
    Full,
    /// Compact format with minimal metadata.
    Compact,
    /// JSON lines, one object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    /// Default level, `RUST_LOG` directives take precedence.
    pub level: LevelFilter,
    /// Stdout format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: LevelFilter::INFO, format: LogFormat::Full }
    }
}

impl LogConfig {
    /// DEBUG when `debug` is set, INFO otherwise.
    pub const fn from_debug_flag(debug: bool, format: LogFormat) -> Self {
        let level = if debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
        Self { level, format }
    }

    /// Initialize the tracing subscriber with the configured options.
    ///
    /// This sets the global default subscriber. Should only be called once.
    pub fn init_tracing_subscriber(&self) -> eyre::Result<()> {
        let filter = EnvFilter::builder().with_default_directive(self.level.into()).from_env_lossy();

        tracing_subscriber::registry()
            .with(filter)
            .with(build_stdout_layer(self.format))
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {}", e))
    }
}

fn build_stdout_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync,
{
    let base = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(false)
        .with_timer(SystemTime);

    match format {
        LogFormat::Full => Box::new(base),
        LogFormat::Compact => Box::new(base.compact()),
        LogFormat::Json => Box::new(base.json()),
    }
}
