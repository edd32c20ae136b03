//! Handler for `POST /events`, which accepts raw upstream events.
//!
//! The body is a producer-shaped event (see [`RawEvent`]). It is completed
//! by [`transform_event`], stamped with the current time as its processing
//! timestamp, and upserted like a `POST /matches` payload.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
};
use chrono::Utc;
use touchline_core::{
  matches::UpsertOutcome,
  store::MatchStore,
  transform::{RawEvent, transform_event},
};

use crate::{ApiState, error::ApiError, store_payload};

/// `POST /events`
pub async fn ingest<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<RawEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<UpsertOutcome>), ApiError>
where
  S: MatchStore,
{
  let Json(event) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let payload = transform_event(event, Utc::now())
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  tracing::debug!(
    match_id = %payload.match_id,
    status = %payload.status,
    event_type = %payload.event_type,
    "transformed event"
  );

  let outcome = store_payload(&state, payload).await?;
  let status = if outcome.created {
    StatusCode::CREATED
  } else {
    StatusCode::OK
  };
  Ok((status, Json(outcome)))
}
