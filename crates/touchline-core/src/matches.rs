//! Match types: the single entity held by the Touchline store.
//!
//! A match document is keyed by its external `match_id`. Every upsert carries
//! the complete record and replaces the stored one wholesale; the store only
//! adds its own metadata (handle, timestamps, revision) around it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Statuses for which a match is considered in progress.
pub const LIVE_STATUSES: &[&str] = &["IN_PLAY", "LIVE", "PAUSED"];

/// Whether `status` denotes a match currently being played.
pub fn is_live_status(status: &str) -> bool { LIVE_STATUSES.contains(&status) }

// ─── Reference data ──────────────────────────────────────────────────────────

/// A club as described by the upstream feed. Descriptive only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  pub id:         String,
  pub name:       String,
  pub short_name: String,
  /// Three-letter abbreviation used as a display code, e.g. `ARS`.
  pub tla:        String,
}

// ─── Score & KPIs ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
  pub home:           u32,
  pub away:           u32,
  pub half_time_home: u32,
  pub half_time_away: u32,
}

/// Which side is ahead on the full-time score.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeadingTeam {
  Home,
  Away,
  Draw,
}

/// Derived summary statistics attached to a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpis {
  /// Wide enough for the sum of two `u32` score components.
  pub total_goals:       u64,
  /// Absolute margin between the two sides.
  pub goal_difference:   u32,
  #[serde(default)]
  pub second_half_goals: u64,
  pub is_draw:           bool,
  pub leading_team:      LeadingTeam,
}

impl Kpis {
  /// Derive the KPI block from a score line.
  pub fn from_score(score: &Score) -> Self {
    let total_goals = u64::from(score.home) + u64::from(score.away);
    let half_time = u64::from(score.half_time_home) + u64::from(score.half_time_away);
    let leading_team = match score.home.cmp(&score.away) {
      std::cmp::Ordering::Greater => LeadingTeam::Home,
      std::cmp::Ordering::Less => LeadingTeam::Away,
      std::cmp::Ordering::Equal => LeadingTeam::Draw,
    };

    Self {
      total_goals,
      goal_difference: score.home.abs_diff(score.away),
      second_half_goals: total_goals.saturating_sub(half_time),
      is_draw: score.home == score.away,
      leading_team,
    }
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// The complete match record supplied by a caller on every upsert.
///
/// Shape is the only thing enforced on deserialisation. Cross-field agreement
/// (KPIs vs. score, `is_live` vs. `status`) can be checked separately with
/// [`MatchPayload::consistency_issues`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPayload {
  pub match_id:            String,
  pub competition:         String,
  #[serde(default)]
  pub matchday:            Option<u32>,
  pub home_team:           Team,
  pub away_team:           Team,
  pub score:               Score,
  #[serde(default)]
  pub kpis:                Option<Kpis>,
  /// Free-form lifecycle state, e.g. `SCHEDULED`, `IN_PLAY`, `FINISHED`.
  pub status:              String,
  pub is_live:             bool,
  #[serde(default, with = "crate::timestamp::option")]
  pub utc_date:            Option<DateTime<Utc>>,
  #[serde(default, with = "crate::timestamp::option")]
  pub event_timestamp:     Option<DateTime<Utc>>,
  /// When the pipeline processed the event; the retention sweep keys on it.
  #[serde(with = "crate::timestamp")]
  pub processed_timestamp: DateTime<Utc>,
  pub event_type:          String,
}

impl MatchPayload {
  /// Human-readable descriptions of every cross-field disagreement in this
  /// record. Empty when the record is self-consistent.
  pub fn consistency_issues(&self) -> Vec<String> {
    let mut issues = Vec::new();

    if let Some(kpis) = &self.kpis {
      let expected = Kpis::from_score(&self.score);
      if kpis.total_goals != expected.total_goals {
        issues.push(format!(
          "kpis.total_goals is {} but the score sums to {}",
          kpis.total_goals, expected.total_goals
        ));
      }
      if kpis.goal_difference != expected.goal_difference {
        issues.push(format!(
          "kpis.goal_difference is {} but the score margin is {}",
          kpis.goal_difference, expected.goal_difference
        ));
      }
      if kpis.is_draw != expected.is_draw {
        issues.push(format!(
          "kpis.is_draw is {} but the score says {}",
          kpis.is_draw, expected.is_draw
        ));
      }
      if kpis.leading_team != expected.leading_team {
        issues.push(format!(
          "kpis.leading_team is {} but the score says {}",
          kpis.leading_team, expected.leading_team
        ));
      }
    }

    if self.is_live != is_live_status(&self.status) {
      issues.push(format!(
        "is_live is {} but status {:?} implies {}",
        self.is_live,
        self.status,
        !self.is_live
      ));
    }

    issues
  }

  /// Fail with [`Error::Inconsistent`] if [`Self::consistency_issues`] finds
  /// anything.
  pub fn check_consistency(&self) -> Result<()> {
    let issues = self.consistency_issues();
    if issues.is_empty() {
      Ok(())
    } else {
      Err(Error::Inconsistent(issues))
    }
  }

  /// `"ARS vs CHE"` style label.
  pub fn fixture_label(&self) -> String {
    format!("{} vs {}", self.home_team.tla, self.away_team.tla)
  }
}

// ─── Stored records ──────────────────────────────────────────────────────────

/// The store-assigned identity of a match document. Stable across upserts.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MatchHandle(pub Uuid);

impl MatchHandle {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for MatchHandle {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for MatchHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A match as held by the store: the last payload written plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMatch {
  pub id:         MatchHandle,
  #[serde(flatten)]
  pub record:     MatchPayload,
  /// When the first upsert for this `match_id` landed.
  pub created_at: DateTime<Utc>,
  /// When the most recent upsert landed.
  pub updated_at: DateTime<Utc>,
  /// Store-wide write counter; higher means more recently written.
  pub revision:   u64,
}

/// Result of [`crate::store::MatchStore::upsert_match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
  pub handle:  MatchHandle,
  /// `true` if no record existed for the `match_id` before this call.
  pub created: bool,
}

#[cfg(test)]
pub(crate) mod tests {
  use chrono::TimeZone;

  use super::*;

  pub fn team(tla: &str) -> Team {
    Team {
      id:         tla.to_lowercase(),
      name:       format!("{tla} FC"),
      short_name: tla.to_owned(),
      tla:        tla.to_owned(),
    }
  }

  pub fn payload(match_id: &str, home: u32, away: u32) -> MatchPayload {
    let score = Score { home, away, half_time_home: 0, half_time_away: 0 };
    MatchPayload {
      match_id: match_id.to_owned(),
      competition: "Premier League".into(),
      matchday: Some(10),
      home_team: team("ARS"),
      away_team: team("CHE"),
      kpis: Some(Kpis::from_score(&score)),
      score,
      status: "IN_PLAY".into(),
      is_live: true,
      utc_date: None,
      event_timestamp: None,
      processed_timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
      event_type: "goal".into(),
    }
  }

  #[test]
  fn kpis_for_home_lead() {
    let kpis = Kpis::from_score(&Score {
      home:           2,
      away:           1,
      half_time_home: 1,
      half_time_away: 0,
    });
    assert_eq!(kpis.total_goals, 3);
    assert_eq!(kpis.goal_difference, 1);
    assert_eq!(kpis.second_half_goals, 2);
    assert!(!kpis.is_draw);
    assert_eq!(kpis.leading_team, LeadingTeam::Home);
  }

  #[test]
  fn kpis_second_half_goals_never_negative() {
    // Half-time figures larger than full-time ones come from stale feeds.
    let kpis = Kpis::from_score(&Score {
      home:           0,
      away:           0,
      half_time_home: 1,
      half_time_away: 1,
    });
    assert_eq!(kpis.second_half_goals, 0);
    assert_eq!(kpis.leading_team, LeadingTeam::Draw);
    assert!(kpis.is_draw);
  }

  #[test]
  fn kpis_for_extreme_scores_do_not_overflow() {
    let score = Score {
      home:           u32::MAX,
      away:           1,
      half_time_home: u32::MAX,
      half_time_away: u32::MAX,
    };
    let kpis = Kpis::from_score(&score);
    assert_eq!(kpis.total_goals, u64::from(u32::MAX) + 1);
    assert_eq!(kpis.goal_difference, u32::MAX - 1);
    assert_eq!(kpis.second_half_goals, 0);
    assert_eq!(kpis.leading_team, LeadingTeam::Home);
  }

  #[test]
  fn extreme_scores_are_checked_without_overflow() {
    let mut p = payload("M1", u32::MAX, 1);
    assert!(p.consistency_issues().is_empty());

    p.kpis = Some(Kpis::from_score(&Score::default()));
    let issues = p.consistency_issues();
    assert!(issues.iter().any(|i| i.contains("4294967296")), "{issues:?}");
  }

  #[test]
  fn consistent_payload_has_no_issues() {
    assert!(payload("M1", 1, 0).consistency_issues().is_empty());
    assert!(payload("M1", 1, 0).check_consistency().is_ok());
  }

  #[test]
  fn mismatched_kpis_and_liveness_are_reported() {
    let mut p = payload("M1", 2, 0);
    p.kpis = Some(Kpis::from_score(&Score::default()));
    p.status = "FINISHED".into();

    let issues = p.consistency_issues();
    assert_eq!(issues.len(), 5, "{issues:?}");
    assert!(matches!(p.check_consistency(), Err(Error::Inconsistent(_))));
  }

  #[test]
  fn payload_accepts_naive_timestamps_and_missing_optionals() {
    let json = serde_json::json!({
      "match_id": "12345",
      "competition": "Premier League",
      "home_team": { "id": "1", "name": "Arsenal FC", "short_name": "Arsenal", "tla": "ARS" },
      "away_team": { "id": "2", "name": "Chelsea FC", "short_name": "Chelsea", "tla": "CHE" },
      "score": { "home": 2, "away": 1, "half_time_home": 1, "half_time_away": 0 },
      "status": "IN_PLAY",
      "is_live": true,
      "processed_timestamp": "2024-01-01T12:00:00.500000",
      "event_type": "match_update"
    });

    let p: MatchPayload = serde_json::from_value(json).unwrap();
    assert_eq!(p.matchday, None);
    assert_eq!(p.kpis, None);
    assert_eq!(p.utc_date, None);
    assert_eq!(p.fixture_label(), "ARS vs CHE");
  }

  #[test]
  fn payload_rejects_negative_scores() {
    let mut json = serde_json::to_value(payload("M1", 1, 0)).unwrap();
    json["score"]["home"] = serde_json::json!(-1);
    assert!(serde_json::from_value::<MatchPayload>(json).is_err());
  }

  #[test]
  fn stored_match_serialises_flat() {
    let stored = StoredMatch {
      id:         MatchHandle::new(),
      record:     payload("M1", 1, 0),
      created_at: Utc::now(),
      updated_at: Utc::now(),
      revision:   3,
    };
    let json = serde_json::to_value(&stored).unwrap();
    assert_eq!(json["match_id"], "M1");
    assert_eq!(json["kpis"]["leading_team"], "home");
    assert_eq!(json["processed_timestamp"], "2024-01-01T00:00:00Z");
  }
}
