//! `touchline`, the command-line client for the Touchline match store.
//!
//! # Usage
//!
//! ```
//! touchline --url http://localhost:8080 live --search arsenal
//! touchline --config ~/.config/touchline/config.toml recent --favorites
//! touchline watch --interval-secs 10
//! touchline sweep --older-than-days 7
//! ```

mod client;
mod filter;
mod table;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client::{ApiClient, LivePoll};
use filter::{Favorites, MatchFilter};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "touchline", about = "Command-line client for the Touchline match store")]
struct Args {
  /// Path to a TOML config file (url, favorites).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the touchline server (default: http://localhost:8080).
  #[arg(long, env = "TOUCHLINE_URL", global = true)]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Matches currently in play.
  Live(ListArgs),
  /// The most recently updated matches.
  Recent {
    /// Only matches with exactly this status, e.g. FINISHED.
    #[arg(long)]
    status: Option<String>,
    #[command(flatten)]
    list:   ListArgs,
  },
  /// Show one match in full.
  Get { match_id: String },
  /// Delete matches processed more than N days ago.
  Sweep {
    #[arg(long, value_name = "N")]
    older_than_days: u32,
  },
  /// Goal statistics over the live matches.
  Stats,
  /// Re-poll the live list and reprint it whenever it changes.
  Watch {
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,
    #[command(flatten)]
    list:          ListArgs,
  },
}

#[derive(clap::Args, Debug, Default)]
struct ListArgs {
  /// Fuzzy-match against team names, TLAs, and match ids.
  #[arg(short, long)]
  search: Option<String>,

  /// Only show matches involving a favourite team.
  #[arg(long)]
  favorites: bool,

  /// Add a favourite team by TLA or name; implies --favorites.
  #[arg(long = "favorite", value_name = "TEAM")]
  favorite: Vec<String>,
}

impl ListArgs {
  fn filter(self, file_favorites: &[String]) -> MatchFilter {
    MatchFilter {
      favorites_only: self.favorites || !self.favorite.is_empty(),
      favorites:      Favorites::new(file_favorites.iter().chain(&self.favorite)),
      search:         self.search,
    }
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:       String,
  #[serde(default)]
  favorites: Vec<String>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  let client = ApiClient::new(base_url)?;

  match args.command {
    Command::Live(list) => {
      let filter = list.filter(&file_cfg.favorites);
      let shown = filter.apply(client.live().await?);
      print!("{}", table::matches(&shown, &filter.favorites));
    }
    Command::Recent { status, list } => {
      let filter = list.filter(&file_cfg.favorites);
      let shown = filter.apply(client.recent(status.as_deref()).await?);
      print!("{}", table::matches(&shown, &filter.favorites));
    }
    Command::Get { match_id } => match client.get(&match_id).await? {
      Some(m) => print!("{}", table::detail(&m)),
      None => anyhow::bail!("match {match_id} not found"),
    },
    Command::Sweep { older_than_days } => {
      let deleted = client.sweep(older_than_days).await?;
      println!("deleted {deleted} match(es) older than {older_than_days} day(s)");
    }
    Command::Stats => print!("{}", table::stats(&client.stats().await?)),
    Command::Watch { interval_secs, list } => {
      let filter = list.filter(&file_cfg.favorites);
      watch(&client, &filter, Duration::from_secs(interval_secs.max(1))).await?;
    }
  }

  Ok(())
}

// ─── Watch loop ───────────────────────────────────────────────────────────────

/// Poll until ctrl-c. A 304 prints nothing; a failed poll is logged and
/// retried on the next tick.
async fn watch(client: &ApiClient, filter: &MatchFilter, every: Duration) -> Result<()> {
  let mut etag: Option<String> = None;
  let mut ticker = tokio::time::interval(every);

  loop {
    tokio::select! {
      signal = tokio::signal::ctrl_c() => {
        signal.context("listening for ctrl-c")?;
        return Ok(());
      }
      _ = ticker.tick() => {}
    }

    match client.poll_live(etag.as_deref()).await {
      Ok(LivePoll::Unchanged) => tracing::debug!("live list unchanged"),
      Ok(LivePoll::Changed { etag: next, matches }) => {
        etag = next;
        let shown = filter.apply(matches);
        println!("── {} ──", Utc::now().format("%H:%M:%S"));
        print!("{}", table::matches(&shown, &filter.favorites));
      }
      Err(e) => tracing::warn!("poll failed: {e:#}"),
    }
  }
}
