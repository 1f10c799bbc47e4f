// src/main.rs

use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use doctrack::shell::{PromptPicker, Shell};
use doctrack::{Config, FsGateway, KvStore, Registry, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("doctrack starting up");

    // ========== LOAD REGISTRY ==========
    let db_path = config.db_path();
    let store = KvStore::open(&db_path)
        .with_context(|| format!("opening store at {}", db_path.display()))?;
    let registry = Registry::load(store).context("loading documents")?;
    tracing::info!("✓ Registry loaded: {} documents", registry.len());

    // ========== WIRE GATEWAY + SESSION ==========
    let gateway = Arc::new(FsGateway::new(Box::new(PromptPicker), config.max_depth));
    let session = Session::new(registry, gateway, config.debounce());

    let mut shell = Shell::new(session);
    shell.run().await?;

    tracing::info!("doctrack shutting down...");
    Ok(())
}
