//! Domain models for the dentalflow system.

mod appointment;
mod billing;
mod patient;

pub use appointment::*;
pub use billing::*;
pub use patient::*;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Generate a timestamp-derived identifier, e.g. `b-1718000000000-3f2a9c1e`.
///
/// The random suffix keeps ids unique when two records are created within
/// the same millisecond.
pub(crate) fn new_id(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), &suffix[..8])
}

/// Resolve an ISO-8601 timestamp or plain `YYYY-MM-DD` date to a calendar day in `tz`.
///
/// Timestamps are converted into `tz` before the date is taken, so two instants
/// compare equal when they fall on the same local day. Plain dates are already
/// local and are returned as-is.
pub fn local_date<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<NaiveDate> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(tz).date_naive());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
