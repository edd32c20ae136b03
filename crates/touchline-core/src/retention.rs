//! Retention sweep: bound store growth by deleting stale matches.

use chrono::{DateTime, TimeDelta, Utc};

use crate::store::MatchStore;

/// The retention cutoff `older_than_days` days before `now`.
///
/// Saturates at the earliest representable instant rather than overflowing.
pub fn cutoff(now: DateTime<Utc>, older_than_days: u32) -> DateTime<Utc> {
  TimeDelta::try_days(i64::from(older_than_days))
    .and_then(|age| now.checked_sub_signed(age))
    .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Delete every match processed more than `older_than_days` days before
/// `now`. Returns the number deleted; a repeat call returns 0.
pub async fn sweep<S: MatchStore>(
  store: &S,
  older_than_days: u32,
  now: DateTime<Utc>,
) -> Result<u64, S::Error> {
  let cutoff = cutoff(now, older_than_days);
  let deleted = store.delete_processed_before(cutoff).await?;
  tracing::info!(older_than_days, %cutoff, deleted, "retention sweep finished");
  Ok(deleted)
}
