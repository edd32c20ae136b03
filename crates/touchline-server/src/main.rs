//! touchline-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! match store, and serves the JSON API under `/api`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use touchline_server::{ServerConfig, app, expand_tilde, spawn_retention};
use touchline_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Touchline match server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  let sweeper = spawn_retention(store.clone(), server_cfg.retention);
  if sweeper.is_some() {
    tracing::info!(
      older_than_days = server_cfg.retention.older_than_days,
      interval_secs = server_cfg.retention.interval_secs,
      "retention sweep enabled"
    );
  }

  let app = app(store, server_cfg.api_options());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  if let Some(task) = sweeper {
    task.abort();
  }
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}
