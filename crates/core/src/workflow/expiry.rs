use chrono::{DateTime, Duration, Utc};

use crate::domain::status::StatusConfig;

/// When an entity that entered `status` at `entered_at` lapses, if the status
/// auto-expires at all.
pub fn expires_at(status: &StatusConfig, entered_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let hours = status.auto_expire_hours?;
    if hours == 0 {
        return None;
    }
    entered_at.checked_add_signed(Duration::hours(i64::from(hours)))
}

pub fn is_expired(status: &StatusConfig, entered_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at(status, entered_at).is_some_and(|deadline| now >= deadline)
}
