//! Stacks balance exporter binary entry point.

mod cli;

use balance_exporter::ExporterConfig;
use clap::Parser;
use cli::Args;
use dotenvy::dotenv;
use tracing::error;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    args.log_config().init_tracing_subscriber()?;

    let config = ExporterConfig::from(args);
    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        std::process::exit(1);
    }

    balance_exporter::run(config).await
}
