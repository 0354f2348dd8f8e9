// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar dates and timestamps.
//!
//! Competition days are calendar dates in the local time zone. Keeping them
//! as `NaiveDate` means there is never a time-of-day component to strip
//! before subtracting two dates.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};

use crate::error::{AppError, Result};

/// Calendar date format used in the document and the API.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date in the local time zone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        AppError::Validation(format!("Invalid date '{}': expected YYYY-MM-DD", raw))
    })
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
