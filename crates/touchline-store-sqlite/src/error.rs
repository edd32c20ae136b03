//! Error type for `touchline-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] touchline_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column held a value no valid write could have produced.
  #[error("corrupt row: {0}")]
  Corrupt(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
