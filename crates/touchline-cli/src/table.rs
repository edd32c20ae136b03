//! Plain-text rendering of matches and stats.

use std::fmt::Write as _;

use touchline_core::{matches::StoredMatch, stats::MatchStats, timestamp};

use crate::filter::Favorites;

const HEADERS: [&str; 7] = ["", "ID", "HOME", "SCORE", "AWAY", "STATUS", "UPDATED"];

fn row(m: &StoredMatch, favorites: &Favorites) -> [String; 7] {
  let r = &m.record;
  let star = if favorites.involves(m) { "*" } else { "" };
  [
    star.to_string(),
    r.match_id.clone(),
    r.home_team.name.clone(),
    format!("{}-{}", r.score.home, r.score.away),
    r.away_team.name.clone(),
    r.status.clone(),
    r.processed_timestamp.format("%Y-%m-%d %H:%M").to_string(),
  ]
}

/// A column-aligned table, one match per line, favourites starred.
pub fn matches(list: &[StoredMatch], favorites: &Favorites) -> String {
  if list.is_empty() {
    return "no matches\n".to_string();
  }

  let rows: Vec<[String; 7]> = list.iter().map(|m| row(m, favorites)).collect();
  let mut widths = HEADERS.map(str::len);
  for r in &rows {
    for (w, cell) in widths.iter_mut().zip(r) {
      *w = (*w).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  let header = HEADERS.map(str::to_string);
  for line in std::iter::once(&header).chain(&rows) {
    let cells: Vec<String> = line
      .iter()
      .zip(widths)
      .map(|(cell, w)| format!("{cell:<w$}"))
      .collect();
    let _ = writeln!(out, "{}", cells.join("  ").trim_end());
  }
  out
}

/// Every field of one match, `key: value` per line.
pub fn detail(m: &StoredMatch) -> String {
  let r = &m.record;
  let mut out = String::new();
  let _ = writeln!(out, "{} ({})", r.fixture_label(), r.match_id);
  let _ = writeln!(out, "competition: {}", r.competition);
  if let Some(day) = r.matchday {
    let _ = writeln!(out, "matchday:    {day}");
  }
  let _ = writeln!(
    out,
    "score:       {} {}-{} {} (HT {}-{})",
    r.home_team.name,
    r.score.home,
    r.score.away,
    r.away_team.name,
    r.score.half_time_home,
    r.score.half_time_away,
  );
  let _ = writeln!(out, "status:      {} (live: {})", r.status, r.is_live);
  if let Some(kpis) = &r.kpis {
    let _ = writeln!(
      out,
      "kpis:        {} goals, margin {}, {} in 2nd half, leading: {}",
      kpis.total_goals, kpis.goal_difference, kpis.second_half_goals, kpis.leading_team,
    );
  }
  if let Some(kickoff) = r.utc_date {
    let _ = writeln!(out, "kickoff:     {}", timestamp::format(&kickoff));
  }
  if let Some(at) = r.event_timestamp {
    let _ = writeln!(out, "event:       {} at {}", r.event_type, timestamp::format(&at));
  } else {
    let _ = writeln!(out, "event:       {}", r.event_type);
  }
  let _ = writeln!(out, "processed:   {}", timestamp::format(&r.processed_timestamp));
  let _ = writeln!(out, "revision:    {}", m.revision);
  out
}

pub fn stats(s: &MatchStats) -> String {
  format!(
    "live matches:  {}\ntotal goals:   {}\naverage goals: {:.2}\n",
    s.match_count, s.total_goals, s.average_goals
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tests::stored;

  #[test]
  fn empty_list() {
    assert_eq!(matches(&[], &Favorites::default()), "no matches\n");
  }

  #[test]
  fn columns_are_aligned_and_favourites_starred() {
    let list = vec![
      stored("1", ("Arsenal FC", "ARS"), ("Chelsea FC", "CHE")),
      stored("22", ("Liverpool FC", "LIV"), ("Manchester City FC", "MCI")),
    ];
    let out = matches(&list, &Favorites::new(["MCI"]));
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].trim_start().starts_with("ID"));
    assert!(lines[1].starts_with("   1"), "{out}");
    assert!(lines[2].starts_with("*  22"), "{out}");

    let away_col = lines[0].find("AWAY").unwrap();
    assert_eq!(lines[1].find("Chelsea FC"), Some(away_col));
    assert_eq!(lines[2].find("Manchester City FC"), Some(away_col));
  }

  #[test]
  fn stats_two_decimals() {
    let s = MatchStats { match_count: 3, total_goals: 7, average_goals: 7.0 / 3.0 };
    assert!(stats(&s).contains("average goals: 2.33"));
  }

  #[test]
  fn detail_lists_kpis() {
    let m = stored("9", ("Arsenal FC", "ARS"), ("Chelsea FC", "CHE"));
    let out = detail(&m);
    assert!(out.starts_with("ARS vs CHE (9)"));
    assert!(out.contains("leading: home"), "{out}");
  }
}
