//! ETags for match list responses, so pollers can skip unchanged results.
//!
//! An ETag is a SHA-256 hash over the ordered `(id, revision)` pairs of the
//! listed matches. Any upsert bumps a revision and any deletion drops a pair,
//! so the tag changes exactly when the rendered list could.

use axum::http::{HeaderMap, header};
use sha2::{Digest, Sha256};
use touchline_core::matches::StoredMatch;

/// Compute the quoted ETag for a list of matches in response order.
pub fn compute_etag(matches: &[StoredMatch]) -> String {
  let mut hasher = Sha256::new();
  for m in matches {
    hasher.update(m.id.0.as_bytes());
    hasher.update(m.revision.to_le_bytes());
  }
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Whether the request's `If-None-Match` header names `etag`.
///
/// Accepts `*`, comma-separated lists, weak (`W/`) tags and bare tags sent
/// without the surrounding quotes.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  let Some(value) = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
  else {
    return false;
  };

  value.split(',').map(str::trim).any(|candidate| {
    candidate == "*"
      || strip_etag_quotes(candidate.trim_start_matches("W/"))
        == strip_etag_quotes(etag)
  })
}

fn strip_etag_quotes(s: &str) -> &str { s.trim_matches('"') }

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;
  use chrono::Utc;
  use touchline_core::matches::{
    Kpis, MatchHandle, MatchPayload, Score, StoredMatch, Team,
  };

  use super::*;

  fn stored(revision: u64) -> StoredMatch {
    let team = Team {
      id:         "1".into(),
      name:       "Arsenal FC".into(),
      short_name: "Arsenal".into(),
      tla:        "ARS".into(),
    };
    StoredMatch {
      id: MatchHandle::new(),
      record: MatchPayload {
        match_id:            format!("M{revision}"),
        competition:         "Premier League".into(),
        matchday:            None,
        home_team:           team.clone(),
        away_team:           team,
        score:               Score::default(),
        kpis:                Some(Kpis::from_score(&Score::default())),
        status:              "IN_PLAY".into(),
        is_live:             true,
        utc_date:            None,
        event_timestamp:     None,
        processed_timestamp: Utc::now(),
        event_type:          "match_update".into(),
      },
      created_at: Utc::now(),
      updated_at: Utc::now(),
      revision,
    }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::IF_NONE_MATCH, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn revision_bump_changes_etag() {
    let a = stored(1);
    let mut b = a.clone();
    b.revision = 2;
    assert_ne!(compute_etag(&[a]), compute_etag(&[b]));
  }

  #[test]
  fn order_matters() {
    let a = stored(1);
    let b = stored(2);
    assert_ne!(
      compute_etag(&[a.clone(), b.clone()]),
      compute_etag(&[b, a])
    );
  }

  #[test]
  fn empty_list_has_stable_etag() {
    assert_eq!(compute_etag(&[]), compute_etag(&[]));
  }

  #[test]
  fn if_none_match_forms() {
    let etag = compute_etag(&[stored(1)]);
    let bare = etag.trim_matches('"').to_string();

    assert!(if_none_match(&headers(&etag), &etag));
    assert!(if_none_match(&headers(&bare), &etag));
    assert!(if_none_match(&headers(&format!("W/{etag}")), &etag));
    assert!(if_none_match(&headers(&format!("\"other\", {etag}")), &etag));
    assert!(if_none_match(&headers("*"), &etag));
    assert!(!if_none_match(&headers("\"stale\""), &etag));
    assert!(!if_none_match(&HeaderMap::new(), &etag));
  }
}
