//! Async HTTP client wrapping the touchline JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, StatusCode, Url, header};
use serde::Deserialize;
use touchline_core::{matches::StoredMatch, stats::MatchStats};

/// Async HTTP client for the touchline JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

/// Result of a conditional poll of the live list.
#[derive(Debug)]
pub enum LivePoll {
  /// The server answered 304 for the supplied ETag.
  Unchanged,
  Changed {
    etag:    Option<String>,
    matches: Vec<StoredMatch>,
  },
}

#[derive(Deserialize)]
struct SweepResult {
  deleted_count: u64,
}

impl ApiClient {
  pub fn new(base_url: String) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  /// `/api/matches/<id>` with `match_id` percent-encoded as one segment.
  fn match_url(&self, match_id: &str) -> Result<Url> {
    let mut url = Url::parse(&self.url("/matches"))
      .with_context(|| format!("invalid base URL {}", self.base_url))?;
    url
      .path_segments_mut()
      .map_err(|_| anyhow!("base URL {} cannot carry a path", self.base_url))?
      .push(match_id);
    Ok(url)
  }

  // ── Lists ─────────────────────────────────────────────────────────────────

  /// `GET /api/matches/live`
  pub async fn live(&self) -> Result<Vec<StoredMatch>> {
    let resp = self
      .client
      .get(self.url("/matches/live"))
      .send()
      .await
      .context("GET /matches/live failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /matches/live → {}", resp.status()));
    }
    resp.json().await.context("deserialising live matches")
  }

  /// `GET /api/matches[?status=<status>]`
  pub async fn recent(&self, status: Option<&str>) -> Result<Vec<StoredMatch>> {
    let mut req = self.client.get(self.url("/matches"));
    if let Some(status) = status {
      req = req.query(&[("status", status)]);
    }
    let resp = req.send().await.context("GET /matches failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /matches → {}", resp.status()));
    }
    resp.json().await.context("deserialising matches")
  }

  /// `GET /api/matches/live` with `If-None-Match: <etag>` when one is known.
  pub async fn poll_live(&self, etag: Option<&str>) -> Result<LivePoll> {
    let mut req = self.client.get(self.url("/matches/live"));
    if let Some(etag) = etag {
      req = req.header(header::IF_NONE_MATCH, etag);
    }
    let resp = req.send().await.context("GET /matches/live failed")?;

    if resp.status() == StatusCode::NOT_MODIFIED {
      return Ok(LivePoll::Unchanged);
    }
    if !resp.status().is_success() {
      return Err(anyhow!("GET /matches/live → {}", resp.status()));
    }
    let etag = resp
      .headers()
      .get(header::ETAG)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);
    let matches = resp.json().await.context("deserialising live matches")?;
    Ok(LivePoll::Changed { etag, matches })
  }

  // ── Single match ──────────────────────────────────────────────────────────

  /// `GET /api/matches/<id>`; `None` on 404.
  pub async fn get(&self, match_id: &str) -> Result<Option<StoredMatch>> {
    let resp = self
      .client
      .get(self.match_url(match_id)?)
      .send()
      .await
      .context("GET /matches/{id} failed")?;

    match resp.status() {
      StatusCode::NOT_FOUND => Ok(None),
      s if s.is_success() => {
        Ok(Some(resp.json().await.context("deserialising match")?))
      }
      s => Err(anyhow!("GET /matches/{match_id} → {s}")),
    }
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  /// `DELETE /api/matches?older_than_days=<n>`
  pub async fn sweep(&self, older_than_days: u32) -> Result<u64> {
    let resp = self
      .client
      .delete(self.url("/matches"))
      .query(&[("older_than_days", older_than_days)])
      .send()
      .await
      .context("DELETE /matches failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("DELETE /matches → {}", resp.status()));
    }
    let result: SweepResult = resp.json().await.context("deserialising sweep result")?;
    Ok(result.deleted_count)
  }

  /// `GET /api/stats`
  pub async fn stats(&self) -> Result<MatchStats> {
    let resp = self
      .client
      .get(self.url("/stats"))
      .send()
      .await
      .context("GET /stats failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /stats → {}", resp.status()));
    }
    resp.json().await.context("deserialising stats")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base: &str) -> ApiClient { ApiClient::new(base.to_string()).unwrap() }

  #[test]
  fn plain_ids_stay_readable() {
    let url = client("http://localhost:8080").match_url("12345").unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/api/matches/12345");
  }

  #[test]
  fn reserved_characters_stay_in_one_segment() {
    let url = client("http://localhost:8080/").match_url("a/b?c#d%e").unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/api/matches/a%2Fb%3Fc%23d%25e");
    assert_eq!(url.query(), None);
    assert_eq!(url.fragment(), None);
  }

  #[test]
  fn base_path_prefix_is_kept() {
    let url = client("https://example.org/touchline").match_url("M 1").unwrap();
    assert_eq!(url.as_str(), "https://example.org/touchline/api/matches/M%201");
  }
}
