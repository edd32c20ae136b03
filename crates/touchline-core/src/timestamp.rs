//! Lenient ISO-8601 timestamp handling.
//!
//! Upstream producers emit both RFC 3339 strings (`2024-01-01T00:00:00Z`) and
//! zone-less timestamps (`2024-01-01T00:00:00.123456`). Zone-less values are
//! read as UTC. Everything is written back out as RFC 3339 with a `Z` suffix.
//! Only years 0000 through 9999 are accepted.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::{Error, Result};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Years whose `%Y` rendering is exactly four digits.
pub const YEAR_RANGE: RangeInclusive<i32> = 0..=9999;

/// Parse an ISO-8601 timestamp, treating zone-less input as UTC.
pub fn parse(s: &str) -> Result<DateTime<Utc>> {
  let s = s.trim();
  let dt = match DateTime::parse_from_rfc3339(s) {
    Ok(dt) => dt.with_timezone(&Utc),
    Err(_) => NAIVE_FORMATS
      .iter()
      .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
      .map(|naive| naive.and_utc())
      .ok_or_else(|| Error::InvalidTimestamp(s.to_owned()))?,
  };
  check_range(dt)
}

/// Fail with [`Error::InvalidTimestamp`] unless `dt` falls in [`YEAR_RANGE`].
pub fn check_range(dt: DateTime<Utc>) -> Result<DateTime<Utc>> {
  if YEAR_RANGE.contains(&dt.year()) {
    Ok(dt)
  } else {
    Err(Error::InvalidTimestamp(format(&dt)))
  }
}

/// Render a timestamp as RFC 3339 in UTC (`...Z`).
pub fn format(dt: &DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ─── serde adapters ──────────────────────────────────────────────────────────

pub fn serialize<S: Serializer>(
  dt: &DateTime<Utc>,
  serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
  serializer.serialize_str(&format(dt))
}

pub fn deserialize<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> std::result::Result<DateTime<Utc>, D::Error> {
  let raw = String::deserialize(deserializer)?;
  parse(&raw).map_err(serde::de::Error::custom)
}

/// The same adapters for `Option<DateTime<Utc>>`; pair with
/// `#[serde(default)]` so missing fields read as `None`.
pub mod option {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(
    dt: &Option<DateTime<Utc>>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    match dt {
      Some(dt) => serializer.serialize_some(&super::format(dt)),
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Option<DateTime<Utc>>, D::Error> {
    Option::<String>::deserialize(deserializer)?
      .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
      .transpose()
  }
}
