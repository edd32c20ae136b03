//! Touchline HTTP server.
//!
//! Mounts the JSON API under `/api` and optionally runs the retention sweep
//! on a timer. The binary in `main.rs` wires these to a SQLite store.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use touchline_api::{ApiOptions, api_router};
use touchline_core::{retention, store::MatchStore};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TOUCHLINE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  /// Reject payloads whose derived fields disagree with the score/status.
  pub strict_validation: bool,
  pub retention:         RetentionConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_string(),
      port:              8080,
      store_path:        PathBuf::from("touchline.db"),
      strict_validation: false,
      retention:         RetentionConfig::default(),
    }
  }
}

/// Periodic retention sweep. An `interval_secs` of 0 disables it.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct RetentionConfig {
  pub older_than_days: u32,
  pub interval_secs:   u64,
}

impl Default for RetentionConfig {
  fn default() -> Self { Self { older_than_days: 7, interval_secs: 0 } }
}

impl ServerConfig {
  /// Load from the TOML file at `path` (optional) layered under the
  /// environment, e.g. `TOUCHLINE_PORT` or `TOUCHLINE_RETENTION__INTERVAL_SECS`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TOUCHLINE")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn api_options(&self) -> ApiOptions {
    ApiOptions { strict_validation: self.strict_validation }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the API nested at `/api`, with request tracing.
pub fn app<S>(store: Arc<S>, options: ApiOptions) -> Router
where
  S: MatchStore + Send + Sync + 'static,
{
  Router::new()
    .nest("/api", api_router(store, options))
    .layer(TraceLayer::new_for_http())
}

// ─── Retention task ───────────────────────────────────────────────────────────

/// Spawn the periodic sweep, or return `None` if it is disabled.
///
/// The first sweep runs immediately. Failures are logged and the task keeps
/// ticking.
pub fn spawn_retention<S>(
  store: Arc<S>,
  cfg: RetentionConfig,
) -> Option<JoinHandle<()>>
where
  S: MatchStore + 'static,
{
  if cfg.interval_secs == 0 {
    return None;
  }
  let period = Duration::from_secs(cfg.interval_secs);

  Some(tokio::spawn(async move {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      if let Err(e) =
        retention::sweep(store.as_ref(), cfg.older_than_days, Utc::now()).await
      {
        tracing::error!(error = %e, "retention sweep failed");
      }
    }
  }))
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chrono::TimeDelta;
  use config::{File, FileFormat};
  use touchline_core::{
    store::MatchChange,
    transform::{ExternalId, RawEvent, transform_event},
  };
  use touchline_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("touchline.db"));
    assert!(!cfg.strict_validation);
    assert_eq!(cfg.retention.older_than_days, 7);
    assert_eq!(cfg.retention.interval_secs, 0);
  }

  #[test]
  fn partial_config_keeps_other_defaults() {
    let cfg = parse(
      r#"
        port = 9000
        strict_validation = true

        [retention]
        interval_secs = 3600
      "#,
    );
    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert!(cfg.api_options().strict_validation);
    assert_eq!(cfg.retention.interval_secs, 3600);
    assert_eq!(cfg.retention.older_than_days, 7);
  }

  #[test]
  fn tilde_expansion_only_touches_home_prefix() {
    let abs = Path::new("/var/lib/touchline.db");
    assert_eq!(expand_tilde(abs), abs);

    let rel = Path::new("data/touchline.db");
    assert_eq!(expand_tilde(rel), rel);

    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/touchline.db")),
        PathBuf::from(home).join("touchline.db")
      );
    }
  }

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let app = app(store, ApiOptions::default());

    let resp = app
      .clone()
      .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn disabled_retention_spawns_nothing() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    assert!(spawn_retention(store, RetentionConfig::default()).is_none());
  }

  #[tokio::test]
  async fn retention_task_sweeps_on_first_tick() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let now = Utc::now();
    for (id, age) in [("OLD", 30), ("NEW", 1)] {
      let event = RawEvent {
        match_id: Some(ExternalId::Text(id.to_string())),
        ..RawEvent::default()
      };
      let payload = transform_event(event, now - TimeDelta::days(age)).unwrap();
      store.upsert_match(payload).await.unwrap();
    }

    let mut changes = store.subscribe();
    let task = spawn_retention(
      store.clone(),
      RetentionConfig { older_than_days: 7, interval_secs: 3600 },
    )
    .unwrap();

    let change = tokio::time::timeout(Duration::from_secs(5), changes.recv())
      .await
      .expect("sweep before timeout")
      .unwrap();
    task.abort();

    assert_eq!(change, MatchChange::Removed { match_ids: vec!["OLD".to_string()] });
    assert!(store.get_match("NEW").await.unwrap().is_some());
  }
}
