//! roster server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `ROSTER_*`
//! environment overrides, opens the configured student store, and serves the
//! JSON API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use roster_server::{ServerConfig, app, build_directory};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster student directory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Override the configured listen port.
  #[arg(short, long)]
  port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut server_cfg =
    ServerConfig::load(&cli.config).context("failed to load configuration")?;
  if let Some(port) = cli.port {
    server_cfg.port = port;
  }

  let directory = build_directory(&server_cfg.backend)
    .await
    .context("failed to open student store")?;

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(directory)).await.context("server error")?;

  Ok(())
}
