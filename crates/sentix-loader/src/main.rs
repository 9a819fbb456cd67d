use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use sentix_loader::config::LoaderConfig;
use sentix_loader::daemon::Daemon;

#[derive(Parser, Debug)]
#[command(
    name = "sentix-loader",
    about = "sentix loader daemon - periodically refreshes news sentiment for every watchlist symbol"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/sentix.toml")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    sentix::init_tracing(cli.json_logs);
    dotenvy::dotenv().ok();

    let config: LoaderConfig = sentix::load_config(&cli.config)?;
    let pipeline =
        sentix::build_pipeline(&config.sentix).context("Failed to build refresh pipeline")?;

    let daemon = Daemon::new(Arc::new(pipeline), config.loader);
    let cancel = daemon.cancel_token();

    // Handle shutdown signals
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received shutdown signal");
        cancel.cancel();
    });

    daemon
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Daemon error: {e}"))?;

    Ok(())
}
