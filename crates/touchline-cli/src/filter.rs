//! Client-side narrowing of match lists: fuzzy search and favourite teams.

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use touchline_core::matches::{StoredMatch, Team};

/// Favourite teams, matched case-insensitively against a team's TLA, name,
/// or short name.
#[derive(Debug, Clone, Default)]
pub struct Favorites(Vec<String>);

impl Favorites {
  pub fn new<I, S>(teams: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut teams: Vec<String> = teams
      .into_iter()
      .map(|t| t.as_ref().trim().to_lowercase())
      .filter(|t| !t.is_empty())
      .collect();
    teams.sort();
    teams.dedup();
    Self(teams)
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn contains(&self, team: &Team) -> bool {
    [&team.tla, &team.name, &team.short_name]
      .into_iter()
      .filter(|v| !v.is_empty())
      .any(|v| self.0.iter().any(|f| f.eq_ignore_ascii_case(v)))
  }

  /// Whether either side of `m` is a favourite.
  pub fn involves(&self, m: &StoredMatch) -> bool {
    self.contains(&m.record.home_team) || self.contains(&m.record.away_team)
  }
}

/// The combined list filter applied by `live`, `recent`, and `watch`.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
  pub search:         Option<String>,
  pub favorites:      Favorites,
  /// Keep only matches involving a favourite.
  pub favorites_only: bool,
}

impl MatchFilter {
  /// Retain the matches that pass, preserving order.
  pub fn apply(&self, matches: Vec<StoredMatch>) -> Vec<StoredMatch> {
    let matcher = SkimMatcherV2::default().ignore_case();
    let search = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    matches
      .into_iter()
      .filter(|m| !self.favorites_only || self.favorites.involves(m))
      .filter(|m| match search {
        Some(query) => searchable(m)
          .iter()
          .any(|field| matcher.fuzzy_match(field, query).is_some()),
        None => true,
      })
      .collect()
  }
}

fn searchable(m: &StoredMatch) -> [&str; 7] {
  let r = &m.record;
  [
    &r.match_id,
    &r.home_team.name,
    &r.home_team.short_name,
    &r.home_team.tla,
    &r.away_team.name,
    &r.away_team.short_name,
    &r.away_team.tla,
  ]
  .map(String::as_str)
}
