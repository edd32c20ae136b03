//! Handlers for `/matches` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/matches` | Body: [`MatchPayload`]; 201 on create, 200 on replace |
//! | `GET`    | `/matches` | ≤ 50 most recent; optional `?status=` |
//! | `GET`    | `/matches/live` | ≤ 20 live, most recent first |
//! | `GET`    | `/matches/:match_id` | 404 if absent |
//! | `DELETE` | `/matches` | `?older_than_days=N`; returns `{"deleted_count": n}` |
//!
//! List responses carry an `ETag`; a matching `If-None-Match` yields 304.

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use touchline_core::{
  matches::{MatchPayload, StoredMatch, UpsertOutcome},
  retention,
  store::MatchStore,
};

use crate::{
  ApiState,
  error::ApiError,
  etag::{compute_etag, if_none_match},
  store_payload,
};

/// Respond with `matches` and their ETag, or a bare 304 if the caller
/// already has this exact list.
fn conditional_list(headers: &HeaderMap, matches: Vec<StoredMatch>) -> Response {
  let etag = compute_etag(&matches);
  if if_none_match(headers, &etag) {
    return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
  }
  ([(header::ETAG, etag)], Json(matches)).into_response()
}

// ─── Upsert ───────────────────────────────────────────────────────────────────

/// `POST /matches`; responds with the stored record's handle.
pub async fn upsert<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<MatchPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<UpsertOutcome>), ApiError>
where
  S: MatchStore,
{
  let Json(payload) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let outcome = store_payload(&state, payload).await?;
  let status = if outcome.created {
    StatusCode::CREATED
  } else {
    StatusCode::OK
  };
  Ok((status, Json(outcome)))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Restrict to matches with exactly this status.
  pub status: Option<String>,
}

/// `GET /matches[?status=<status>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: MatchStore,
{
  let matches = match params.status.as_deref() {
    Some(status) => state.store.matches_by_status(status).await,
    None => state.store.recent_matches().await,
  }
  .map_err(ApiError::store)?;
  Ok(conditional_list(&headers, matches))
}

/// `GET /matches/live`
pub async fn live<S>(
  State(state): State<ApiState<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: MatchStore,
{
  let matches = state.store.live_matches().await.map_err(ApiError::store)?;
  Ok(conditional_list(&headers, matches))
}

/// `GET /matches/:match_id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(match_id): Path<String>,
) -> Result<Json<StoredMatch>, ApiError>
where
  S: MatchStore,
{
  let found = state
    .store
    .get_match(&match_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("match {match_id} not found")))?;
  Ok(Json(found))
}

// ─── Retention ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SweepParams {
  pub older_than_days: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SweepResult {
  pub deleted_count: u64,
}

/// `DELETE /matches?older_than_days=N`
pub async fn sweep<S>(
  State(state): State<ApiState<S>>,
  params: Result<Query<SweepParams>, QueryRejection>,
) -> Result<Json<SweepResult>, ApiError>
where
  S: MatchStore,
{
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let deleted_count = retention::sweep(state.store.as_ref(), params.older_than_days, Utc::now())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(SweepResult { deleted_count }))
}
