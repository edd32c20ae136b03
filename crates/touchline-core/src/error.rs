//! Error types for `touchline-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid timestamp: {0:?}")]
  InvalidTimestamp(String),

  #[error("event has no match_id")]
  MissingMatchId,

  #[error("inconsistent match record: {}", .0.join("; "))]
  Inconsistent(Vec<String>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
