//! The `MatchStore` trait and change notifications.
//!
//! The trait is implemented by storage backends (e.g. `touchline-store-sqlite`).
//! Higher layers (`touchline-api`, the server) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::matches::{MatchHandle, MatchPayload, StoredMatch, UpsertOutcome};

/// Maximum number of records returned by [`MatchStore::live_matches`].
pub const LIVE_LIMIT: usize = 20;

/// Maximum number of records returned by [`MatchStore::recent_matches`] and
/// [`MatchStore::matches_by_status`].
pub const RECENT_LIMIT: usize = 50;

/// Buffer size for change-notification channels.
pub const CHANGE_CHANNEL_CAPACITY: usize = 256;

// ─── Change notifications ────────────────────────────────────────────────────

/// Published after every committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchChange {
  Upserted {
    match_id: String,
    handle:   MatchHandle,
    created:  bool,
  },
  Removed {
    match_ids: Vec<String>,
  },
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a match store backend.
///
/// At most one record exists per `match_id`. Writes are whole-record
/// replacements; the last committed write wins.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait MatchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert `payload` if no record has its `match_id`, otherwise replace every
  /// field of the existing record while keeping its handle.
  fn upsert_match(
    &self,
    payload: MatchPayload,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + '_;

  /// Delete every record whose `processed_timestamp` is strictly before
  /// `cutoff`. Returns the number of records deleted.
  fn delete_processed_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Up to [`LIVE_LIMIT`] records with `is_live = true`, most recently
  /// written first.
  fn live_matches(
    &self,
  ) -> impl Future<Output = Result<Vec<StoredMatch>, Self::Error>> + Send + '_;

  /// Up to [`RECENT_LIMIT`] records regardless of liveness, most recently
  /// written first.
  fn recent_matches(
    &self,
  ) -> impl Future<Output = Result<Vec<StoredMatch>, Self::Error>> + Send + '_;

  /// Up to [`RECENT_LIMIT`] records whose `status` equals `status` exactly,
  /// most recently written first.
  fn matches_by_status<'a>(
    &'a self,
    status: &'a str,
  ) -> impl Future<Output = Result<Vec<StoredMatch>, Self::Error>> + Send + 'a;

  /// The record for `match_id`, or `None` if there is none.
  fn get_match<'a>(
    &'a self,
    match_id: &'a str,
  ) -> impl Future<Output = Result<Option<StoredMatch>, Self::Error>> + Send + 'a;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Receive a [`MatchChange`] for every write committed after this call.
  fn subscribe(&self) -> broadcast::Receiver<MatchChange>;
}
