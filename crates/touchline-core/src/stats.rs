//! Aggregate statistics over a set of matches, as shown on the dashboard's
//! statistics panel.

use serde::{Deserialize, Serialize};

use crate::matches::StoredMatch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
  pub match_count:   usize,
  /// Sum of `kpis.total_goals`; matches without a KPI block count as 0.
  pub total_goals:   u64,
  /// `total_goals / match_count`, or 0 for an empty set.
  pub average_goals: f64,
}

impl MatchStats {
  pub fn over(matches: &[StoredMatch]) -> Self {
    let total_goals: u64 = matches
      .iter()
      .filter_map(|m| m.record.kpis.as_ref())
      .map(|k| k.total_goals)
      .sum();

    let average_goals = if matches.is_empty() {
      0.0
    } else {
      total_goals as f64 / matches.len() as f64
    };

    Self { match_count: matches.len(), total_goals, average_goals }
  }
}
