//! roster server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), applies
//! `ROSTER_*` environment overrides, opens the configured store, and serves
//! the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use roster_core::{MemoryStore, store::RosterStore};
use roster_server::{ServerConfig, StoreBackend};
use roster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster review-assignment server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  match cfg.store {
    StoreBackend::Sqlite => {
      let path = cfg.resolved_store_path();
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      tracing::info!(path = %path.display(), "opened sqlite store");
      serve(&cfg, store).await
    }
    StoreBackend::Memory => {
      tracing::warn!("using in-memory store; data is lost on exit");
      serve(&cfg, MemoryStore::new()).await
    }
  }
}

async fn serve<S: RosterStore>(cfg: &ServerConfig, store: S) -> anyhow::Result<()> {
  let app = roster_server::app(Arc::new(store));
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
