//! Handler for `GET /stats`: aggregates over the live matches.

use axum::{Json, extract::State};
use touchline_core::{stats::MatchStats, store::MatchStore};

use crate::{ApiState, error::ApiError};

/// `GET /stats`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<MatchStats>, ApiError>
where
  S: MatchStore,
{
  let live = state.store.live_matches().await.map_err(ApiError::store)?;
  Ok(Json(MatchStats::over(&live)))
}
