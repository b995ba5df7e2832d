//! Topic Weight Daemon
//!
//! Serves topic analysis and follow-up chat over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use topicweightd::config::Config;
use topicweightd::server::{self, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "topicweightd", version, about = "Topic Weight analysis daemon")]
struct Args {
    /// Path to config file (overrides TOPICWEIGHT_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides server.bind_addr)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("[BOOT] Topic Weight Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = Config::resolve_path(args.config.as_deref());
    let mut config = Config::load(&config_path)
        .context("Failed to load configuration")?
        .apply_env();
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }

    let state = AppState::from_config(&config).context("Failed to initialize providers")?;
    info!("[BOOT] Providers ready");

    server::run(&config, state).await
}
