//! `GET /matches/changes`: the server-sent change feed.
//!
//! Each committed write is sent as a `change` event whose data is the JSON
//! [`MatchChange`](touchline_core::store::MatchChange). A subscriber that
//! falls too far behind gets a `lagged` event carrying the number of skipped
//! changes and should re-poll the list endpoints.

use std::convert::Infallible;

use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, stream};
use tokio::sync::broadcast::error::RecvError;
use touchline_core::store::MatchStore;

use crate::ApiState;

pub async fn stream<S>(
  State(state): State<ApiState<S>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
  S: MatchStore,
{
  let rx = state.store.subscribe();

  let events = stream::unfold(rx, |mut rx| async move {
    loop {
      match rx.recv().await {
        Ok(change) => match Event::default().event("change").json_data(&change) {
          Ok(event) => return Some((Ok::<_, Infallible>(event), rx)),
          Err(e) => tracing::warn!(error = %e, "dropping unserialisable change"),
        },
        Err(RecvError::Lagged(skipped)) => {
          tracing::warn!(skipped, "change subscriber lagged");
          let event = Event::default().event("lagged").data(skipped.to_string());
          return Some((Ok(event), rx));
        }
        Err(RecvError::Closed) => return None,
      }
    }
  });

  Sse::new(events).keep_alive(KeepAlive::default())
}
