//! Turning raw upstream events into complete match records.
//!
//! The ingestion pipeline forwards football-data style events: numeric ids,
//! nullable score fields, partially populated team objects. This module fills
//! in defaults, derives the KPI block and liveness flag, and stamps the
//! processing time so the result can be upserted as-is.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
  Error, Result,
  matches::{Kpis, MatchPayload, Score, Team, is_live_status},
};

pub const DEFAULT_COMPETITION: &str = "Premier League";
pub const DEFAULT_EVENT_TYPE: &str = "match_update";
pub const UNKNOWN_STATUS: &str = "UNKNOWN";
pub const UNKNOWN_TEAM: &str = "Unknown";

// ─── Raw event shape ─────────────────────────────────────────────────────────

/// An identifier that upstream may send as either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
  Number(i64),
  Text(String),
}

impl fmt::Display for ExternalId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Number(n) => write!(f, "{n}"),
      Self::Text(s) => f.write_str(s),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeam {
  pub id:         Option<ExternalId>,
  pub name:       Option<String>,
  pub short_name: Option<String>,
  pub tla:        Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawScore {
  pub home:           Option<u32>,
  pub away:           Option<u32>,
  pub half_time_home: Option<u32>,
  pub half_time_away: Option<u32>,
}

/// A match event as produced upstream. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
  pub match_id:    Option<ExternalId>,
  pub competition: Option<String>,
  pub matchday:    Option<u32>,
  #[serde(default)]
  pub home_team:   Option<RawTeam>,
  #[serde(default)]
  pub away_team:   Option<RawTeam>,
  #[serde(default)]
  pub score:       Option<RawScore>,
  pub status:      Option<String>,
  #[serde(default, with = "crate::timestamp::option")]
  pub utc_date:    Option<DateTime<Utc>>,
  /// When the producer observed the event.
  #[serde(default, with = "crate::timestamp::option")]
  pub timestamp:   Option<DateTime<Utc>>,
  pub event_type:  Option<String>,
}

impl RawEvent {
  pub fn from_json(raw: &str) -> Result<Self> { Ok(serde_json::from_str(raw)?) }
}

// ─── Transform ───────────────────────────────────────────────────────────────

fn team(raw: Option<RawTeam>) -> Team {
  let raw = raw.unwrap_or_default();
  Team {
    id:         raw.id.map(|id| id.to_string()).unwrap_or_default(),
    name:       raw.name.unwrap_or_else(|| UNKNOWN_TEAM.to_owned()),
    short_name: raw.short_name.unwrap_or_default(),
    tla:        raw.tla.unwrap_or_default(),
  }
}

/// Build the complete record for `event`, processed at `processed_at`.
///
/// Missing score components count as 0. `is_live` is derived from the status.
pub fn transform_event(
  event: RawEvent,
  processed_at: DateTime<Utc>,
) -> Result<MatchPayload> {
  let match_id = event.match_id.ok_or(Error::MissingMatchId)?.to_string();

  let raw_score = event.score.unwrap_or_default();
  let score = Score {
    home:           raw_score.home.unwrap_or(0),
    away:           raw_score.away.unwrap_or(0),
    half_time_home: raw_score.half_time_home.unwrap_or(0),
    half_time_away: raw_score.half_time_away.unwrap_or(0),
  };

  let status = event.status.unwrap_or_else(|| UNKNOWN_STATUS.to_owned());

  Ok(MatchPayload {
    match_id,
    competition: event
      .competition
      .unwrap_or_else(|| DEFAULT_COMPETITION.to_owned()),
    matchday: event.matchday,
    home_team: team(event.home_team),
    away_team: team(event.away_team),
    kpis: Some(Kpis::from_score(&score)),
    score,
    is_live: is_live_status(&status),
    status,
    utc_date: event.utc_date,
    event_timestamp: event.timestamp,
    processed_timestamp: processed_at,
    event_type: event
      .event_type
      .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_owned()),
  })
}
