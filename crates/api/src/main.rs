//! Smart Brake Alert - Main Entry Point

use std::path::PathBuf;

use api::{init_logging, run, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;
    init_logging(&config.logging)?;

    info!("=== Smart Brake Alert v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Starting collision warning pipeline...");

    run(config).await
}
