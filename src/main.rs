//! # Connector Console Entry Point

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use connector_console::{
    api_client::HttpApiClient, config::ConfigLoader, server::run_server, telemetry::init_tracing,
};

#[derive(Debug, Parser)]
#[command(name = "connector-console", version, about = "Connector management console")]
struct Cli {
    /// Print the resolved configuration (secrets redacted) and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;

    if cli.print_config {
        println!("{}", config.redacted_json()?);
        return Ok(());
    }

    init_tracing(&config)?;
    tracing::info!(profile = %config.profile, "Loaded configuration");

    let api = HttpApiClient::from_config(&config).context("failed to build backend client")?;
    run_server(config, Arc::new(api)).await?;

    Ok(())
}
