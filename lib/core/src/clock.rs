//! Timestamp formatting for response envelopes.

use chrono::{DateTime, SecondsFormat, Utc};

/// Returns the current time as an RFC 3339 string with millisecond precision
/// and a `Z` suffix, e.g. `2024-05-01T12:00:00.000Z`.
#[must_use]
pub fn iso_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Formats the given instant the same way as [`iso_timestamp`].
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
