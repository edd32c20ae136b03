//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored in a fixed-width UTC form
//! (`YYYY-MM-DDTHH:MM:SS.fffffffffZ`) so that textual comparison in SQL matches
//! chronological order. Teams, score and KPIs are stored as compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use touchline_core::{
  matches::{Kpis, MatchHandle, MatchPayload, Score, StoredMatch, Team},
  timestamp,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_handle(handle: MatchHandle) -> String {
  handle.0.hyphenated().to_string()
}

pub fn decode_handle(s: &str) -> Result<MatchHandle> {
  Ok(MatchHandle(Uuid::parse_str(s)?))
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.format("%Y-%m-%dT%H:%M:%S%.9fZ").to_string()
}

/// [`encode_dt`] for caller-supplied values, which must fall in
/// [`timestamp::YEAR_RANGE`] to keep the text form fixed-width.
pub fn encode_checked_dt(dt: DateTime<Utc>) -> Result<String> {
  Ok(encode_dt(timestamp::check_range(dt)?))
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> { Ok(timestamp::parse(s)?) }

// ─── Structured columns ───────────────────────────────────────────────────────

pub fn encode_json<T: serde::Serialize>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

fn decode_json<T: serde::de::DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawMatch`].
pub const MATCH_COLUMNS: &str = "id, match_id, competition, matchday, home_team, away_team, \
   score, kpis, status, is_live, utc_date, event_timestamp, processed_timestamp, event_type, \
   created_at, updated_at, revision";

/// A [`MatchPayload`] flattened into column values, ready to bind.
pub struct EncodedPayload {
  pub match_id:            String,
  pub competition:         String,
  pub matchday:            Option<u32>,
  pub home_team:           String,
  pub away_team:           String,
  pub score:               String,
  pub kpis:                Option<String>,
  pub status:              String,
  pub is_live:             bool,
  pub utc_date:            Option<String>,
  pub event_timestamp:     Option<String>,
  pub processed_timestamp: String,
  pub event_type:          String,
}

impl EncodedPayload {
  pub fn new(p: &MatchPayload) -> Result<Self> {
    Ok(Self {
      match_id:            p.match_id.clone(),
      competition:         p.competition.clone(),
      matchday:            p.matchday,
      home_team:           encode_json(&p.home_team)?,
      away_team:           encode_json(&p.away_team)?,
      score:               encode_json(&p.score)?,
      kpis:                p.kpis.as_ref().map(encode_json).transpose()?,
      status:              p.status.clone(),
      is_live:             p.is_live,
      utc_date:            p.utc_date.map(encode_checked_dt).transpose()?,
      event_timestamp:     p.event_timestamp.map(encode_checked_dt).transpose()?,
      processed_timestamp: encode_checked_dt(p.processed_timestamp)?,
      event_type:          p.event_type.clone(),
    })
  }
}

/// Raw values read directly from a `matches` row.
pub struct RawMatch {
  pub id:                  String,
  pub match_id:            String,
  pub competition:         String,
  pub matchday:            Option<u32>,
  pub home_team:           String,
  pub away_team:           String,
  pub score:               String,
  pub kpis:                Option<String>,
  pub status:              String,
  pub is_live:             bool,
  pub utc_date:            Option<String>,
  pub event_timestamp:     Option<String>,
  pub processed_timestamp: String,
  pub event_type:          String,
  pub created_at:          String,
  pub updated_at:          String,
  pub revision:            i64,
}

impl RawMatch {
  /// Read a row selected with [`MATCH_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                  row.get(0)?,
      match_id:            row.get(1)?,
      competition:         row.get(2)?,
      matchday:            row.get(3)?,
      home_team:           row.get(4)?,
      away_team:           row.get(5)?,
      score:               row.get(6)?,
      kpis:                row.get(7)?,
      status:              row.get(8)?,
      is_live:             row.get(9)?,
      utc_date:            row.get(10)?,
      event_timestamp:     row.get(11)?,
      processed_timestamp: row.get(12)?,
      event_type:          row.get(13)?,
      created_at:          row.get(14)?,
      updated_at:          row.get(15)?,
      revision:            row.get(16)?,
    })
  }

  pub fn into_stored(self) -> Result<StoredMatch> {
    let home_team: Team = decode_json(&self.home_team)?;
    let away_team: Team = decode_json(&self.away_team)?;
    let score: Score = decode_json(&self.score)?;
    let kpis: Option<Kpis> = self.kpis.as_deref().map(decode_json).transpose()?;

    let revision = u64::try_from(self.revision)
      .map_err(|_| Error::Corrupt(format!("negative revision {}", self.revision)))?;

    Ok(StoredMatch {
      id: decode_handle(&self.id)?,
      record: MatchPayload {
        match_id: self.match_id,
        competition: self.competition,
        matchday: self.matchday,
        home_team,
        away_team,
        score,
        kpis,
        status: self.status,
        is_live: self.is_live,
        utc_date: self.utc_date.as_deref().map(decode_dt).transpose()?,
        event_timestamp: self.event_timestamp.as_deref().map(decode_dt).transpose()?,
        processed_timestamp: decode_dt(&self.processed_timestamp)?,
        event_type: self.event_type,
      },
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      revision,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
    assert!(encode_dt(earlier) < encode_dt(later));
    assert_eq!(encode_dt(later), "2024-01-10T00:00:00.000000000Z");
  }

  #[test]
  fn five_digit_years_are_not_encoded() {
    let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
    assert!(encode_checked_dt(far).is_err());
    let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
    assert_eq!(encode_checked_dt(last).unwrap().len(), "2024-01-10T00:00:00.000000000Z".len());
  }

  #[test]
  fn timestamps_roundtrip_at_nanosecond_precision() {
    let dt = Utc.timestamp_nanos(1_700_000_000_123_456_789);
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }
}
