//! [`SqliteStore`], the SQLite implementation of [`MatchStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, types::Value};
use tokio::sync::broadcast;
use touchline_core::{
  matches::{MatchHandle, MatchPayload, StoredMatch, UpsertOutcome},
  store::{CHANGE_CHANNEL_CAPACITY, LIVE_LIMIT, MatchChange, MatchStore, RECENT_LIMIT},
};

use crate::{
  Result,
  encode::{EncodedPayload, MATCH_COLUMNS, RawMatch, decode_handle, encode_dt, encode_handle},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Touchline match store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection and the change channel are
/// reference-counted, and clones share both.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  changes: broadcast::Sender<MatchChange>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
    Ok(Self { conn, changes })
  }

  /// Publish `change` to current subscribers. Having none is not an error.
  ///
  /// Called on the connection thread right after the write commits, so
  /// subscribers see changes in commit order.
  fn publish(changes: &broadcast::Sender<MatchChange>, change: MatchChange) {
    let _ = changes.send(change);
  }

  /// Run a `SELECT {MATCH_COLUMNS} ...` statement and decode every row.
  async fn query_matches(
    &self,
    sql: String,
    params: Vec<Value>,
  ) -> Result<Vec<StoredMatch>> {
    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawMatch::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_stored).collect()
  }
}

// ─── MatchStore impl ─────────────────────────────────────────────────────────

impl MatchStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_match(&self, payload: MatchPayload) -> Result<UpsertOutcome> {
    let enc = EncodedPayload::new(&payload)?;
    let fresh = MatchHandle::new();
    let fresh_id = encode_handle(fresh);
    let now_str = encode_dt(Utc::now());
    let changes = self.changes.clone();

    // Lookup and write share one transaction on the connection thread, so
    // concurrent upserts of the same match_id serialize and the later wins.
    let (handle, created): (MatchHandle, bool) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
          .query_row(
            "SELECT id FROM matches WHERE match_id = ?1",
            rusqlite::params![enc.match_id],
            |r| r.get(0),
          )
          .optional()?;

        let revision: i64 = tx.query_row(
          "UPDATE counters SET value = value + 1 WHERE name = 'revision'
           RETURNING value",
          [],
          |r| r.get(0),
        )?;

        let outcome = match existing {
          Some(id) => {
            tx.execute(
              "UPDATE matches SET
                 competition = ?2, matchday = ?3, home_team = ?4, away_team = ?5,
                 score = ?6, kpis = ?7, status = ?8, is_live = ?9, utc_date = ?10,
                 event_timestamp = ?11, processed_timestamp = ?12, event_type = ?13,
                 updated_at = ?14, revision = ?15
               WHERE id = ?1",
              rusqlite::params![
                id,
                enc.competition,
                enc.matchday,
                enc.home_team,
                enc.away_team,
                enc.score,
                enc.kpis,
                enc.status,
                enc.is_live,
                enc.utc_date,
                enc.event_timestamp,
                enc.processed_timestamp,
                enc.event_type,
                now_str,
                revision,
              ],
            )?;
            let handle = decode_handle(&id)
              .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            (handle, false)
          }
          None => {
            tx.execute(
              "INSERT INTO matches (
                 id, match_id, competition, matchday, home_team, away_team,
                 score, kpis, status, is_live, utc_date, event_timestamp,
                 processed_timestamp, event_type, created_at, updated_at, revision
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15, ?16)",
              rusqlite::params![
                fresh_id,
                enc.match_id,
                enc.competition,
                enc.matchday,
                enc.home_team,
                enc.away_team,
                enc.score,
                enc.kpis,
                enc.status,
                enc.is_live,
                enc.utc_date,
                enc.event_timestamp,
                enc.processed_timestamp,
                enc.event_type,
                now_str,
                revision,
              ],
            )?;
            (fresh, true)
          }
        };

        tx.commit()?;
        let (handle, created) = outcome;
        Self::publish(&changes, MatchChange::Upserted {
          match_id: enc.match_id,
          handle,
          created,
        });
        Ok(outcome)
      })
      .await?;

    tracing::debug!(match_id = %payload.match_id, %handle, created, "upserted match");
    Ok(UpsertOutcome { handle, created })
  }

  async fn delete_processed_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
    let cutoff_str = encode_dt(cutoff);

    let changes = self.changes.clone();

    let deleted: u64 = self
      .conn
      .call(move |conn| {
        let match_ids = {
          let mut stmt = conn.prepare(
            "DELETE FROM matches WHERE processed_timestamp < ?1 RETURNING match_id",
          )?;
          stmt
            .query_map(rusqlite::params![cutoff_str], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?
        };

        let deleted = match_ids.len() as u64;
        if !match_ids.is_empty() {
          Self::publish(&changes, MatchChange::Removed { match_ids });
        }
        Ok(deleted)
      })
      .await?;

    Ok(deleted)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn live_matches(&self) -> Result<Vec<StoredMatch>> {
    self
      .query_matches(
        format!(
          "SELECT {MATCH_COLUMNS} FROM matches
           WHERE is_live = 1
           ORDER BY revision DESC
           LIMIT ?1"
        ),
        vec![Value::Integer(LIVE_LIMIT as i64)],
      )
      .await
  }

  async fn recent_matches(&self) -> Result<Vec<StoredMatch>> {
    self
      .query_matches(
        format!(
          "SELECT {MATCH_COLUMNS} FROM matches
           ORDER BY revision DESC
           LIMIT ?1"
        ),
        vec![Value::Integer(RECENT_LIMIT as i64)],
      )
      .await
  }

  async fn matches_by_status(&self, status: &str) -> Result<Vec<StoredMatch>> {
    self
      .query_matches(
        format!(
          "SELECT {MATCH_COLUMNS} FROM matches
           WHERE status = ?1
           ORDER BY revision DESC
           LIMIT ?2"
        ),
        vec![
          Value::Text(status.to_owned()),
          Value::Integer(RECENT_LIMIT as i64),
        ],
      )
      .await
  }

  async fn get_match(&self, match_id: &str) -> Result<Option<StoredMatch>> {
    let mut found = self
      .query_matches(
        format!("SELECT {MATCH_COLUMNS} FROM matches WHERE match_id = ?1"),
        vec![Value::Text(match_id.to_owned())],
      )
      .await?;
    Ok(found.pop())
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  fn subscribe(&self) -> broadcast::Receiver<MatchChange> { self.changes.subscribe() }
}
