//! Vidavox CLI entry point.

use anyhow::Result;
use clap::Parser;
use vidavox_rs::Client;

mod commands;
mod output;
mod telemetry;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Configuration is assembled once here and passed down
    let config = cli.load_config(std::env::vars())?;

    let _guard = telemetry::init_telemetry(&config)?;

    tracing::debug!("vidavox starting");
    tracing::debug!("  Base URL: {}", config.normalized_base_url());
    tracing::debug!("  Timeout: {}s", config.timeout_secs);
    tracing::debug!("  Config: {:?}", config.redacted());

    let client = Client::from_config(&config)?;
    cli.execute(&client).await
}
