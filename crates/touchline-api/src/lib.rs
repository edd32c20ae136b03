//! JSON REST API for Touchline.
//!
//! Exposes an axum [`Router`] backed by any [`touchline_core::store::MatchStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", touchline_api::api_router(store.clone(), ApiOptions::default()))
//! ```

pub mod changes;
pub mod error;
pub mod etag;
pub mod events;
pub mod matches;
pub mod stats;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use serde_json::{Value, json};
use touchline_core::{matches::MatchPayload, store::MatchStore};

pub use error::ApiError;

/// Behaviour switches for the write endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiOptions {
  /// Reject payloads whose KPIs disagree with the score or whose `is_live`
  /// disagrees with the status. When off they are stored with a warning.
  pub strict_validation: bool,
}

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub options: ApiOptions,
}

// Manual impl: cloning the `Arc` must not require `S: Clone`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), options: self.options }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, options: ApiOptions) -> Router<()>
where
  S: MatchStore + Send + Sync + 'static,
{
  Router::new()
    // Matches
    .route(
      "/matches",
      get(matches::list::<S>)
        .post(matches::upsert::<S>)
        .delete(matches::sweep::<S>),
    )
    .route("/matches/live", get(matches::live::<S>))
    .route("/matches/changes", get(changes::stream::<S>))
    .route("/matches/{match_id}", get(matches::get_one::<S>))
    // Raw upstream events
    .route("/events", post(events::ingest::<S>))
    // Aggregates
    .route("/stats", get(stats::handler::<S>))
    .route("/health", get(health))
    .with_state(ApiState { store, options })
}

/// `GET /health`
async fn health() -> Json<Value> {
  Json(json!({ "status": "healthy", "service": "touchline" }))
}

/// Validate `payload` per `state.options` and upsert it.
pub(crate) async fn store_payload<S>(
  state: &ApiState<S>,
  payload: MatchPayload,
) -> Result<touchline_core::matches::UpsertOutcome, ApiError>
where
  S: MatchStore,
{
  if let Err(e) = payload.check_consistency() {
    if state.options.strict_validation {
      tracing::warn!(match_id = %payload.match_id, error = %e, "rejected match");
      return Err(ApiError::BadRequest(e.to_string()));
    }
    tracing::warn!(match_id = %payload.match_id, error = %e, "storing inconsistent match");
  }

  state
    .store
    .upsert_match(payload)
    .await
    .map_err(ApiError::store)
}
