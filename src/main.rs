use clap::Parser;
use dotenvy::dotenv;
use maintenance_gate::{cli, errors::Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Parse the command line and run it
    let args = cli::Cli::parse();
    cli::run(args)
        .await
        .inspect_err(|e| error!("maintenance-gate failed: {}", e))
}
