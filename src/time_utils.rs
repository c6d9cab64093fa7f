// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Absolute expiry for a relative lifetime in seconds.
///
/// Returns `None` for a zero or negative lifetime, which means "no expiry",
/// and for a lifetime too large to represent as a timestamp.
pub fn expiry_from_lifetime(now: DateTime<Utc>, lifetime_secs: i64) -> Option<String> {
    if lifetime_secs <= 0 {
        return None;
    }
    let lifetime = Duration::try_seconds(lifetime_secs)?;
    now.checked_add_signed(lifetime).map(format_utc_rfc3339)
}
