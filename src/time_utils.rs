// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serializer;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Serde adapter emitting [`format_utc_rfc3339`].
pub fn serialize_rfc3339<S: Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_utc_rfc3339(*date))
}

/// Human-readable timestamp in the viewer's local timezone.
pub fn format_local(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_uses_z_suffix() {
        let date = DateTime::from_timestamp(1_767_225_600, 999_000_000).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2026-01-01T00:00:00Z");
    }
}
