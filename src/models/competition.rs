// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Competition model and day-of-competition progress.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::days_between;

/// The single time-boxed challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub name: String,
    /// First day of the competition (local calendar date)
    pub start_date: NaiveDate,
    /// Length in days, at least 1
    pub duration_days: u32,
    /// When the competition was started (RFC 3339)
    #[serde(default)]
    pub created_at: String,
}

impl Competition {
    /// Last calendar day of the competition.
    ///
    /// Saturates at the latest representable date for absurd durations.
    pub fn end_date(&self) -> NaiveDate {
        let span = chrono::Days::new(u64::from(self.duration_days.max(1)) - 1);
        self.start_date
            .checked_add_days(span)
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Where `today` falls within the competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompetitionProgress {
    /// Day number for display, clamped to `1..=duration_days`
    pub day: u32,
    /// Unclamped day number (may be <= 0 before the start or exceed the duration)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub raw_day: i64,
    pub duration_days: u32,
    pub percent: u32,
    pub days_left: u32,
    pub has_started: bool,
    pub has_ended: bool,
}

impl CompetitionProgress {
    pub fn compute(competition: &Competition, today: NaiveDate) -> Self {
        let duration = i64::from(competition.duration_days.max(1));
        let raw_day = days_between(competition.start_date, today) + 1;

        let elapsed = raw_day.clamp(0, duration);
        // Round half up, as a percentage of the whole duration.
        let percent = ((200 * elapsed + duration) / (2 * duration)).min(100);
        let days_left = (duration - raw_day).clamp(0, duration);

        Self {
            day: raw_day.clamp(1, duration) as u32,
            raw_day,
            duration_days: competition.duration_days,
            percent: percent as u32,
            days_left: days_left as u32,
            has_started: raw_day >= 1,
            has_ended: raw_day > duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn competition(duration_days: u32) -> Competition {
        Competition {
            name: "Spring Shape-Up".to_string(),
            start_date: date(2024, 1, 1),
            duration_days,
            created_at: "2024-01-01T08:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_progress_midway() {
        let progress = CompetitionProgress::compute(&competition(10), date(2024, 1, 5));
        assert_eq!(progress.day, 5);
        assert_eq!(progress.percent, 50);
        assert_eq!(progress.days_left, 5);
        assert!(progress.has_started);
        assert!(!progress.has_ended);
    }

    #[test]
    fn test_progress_after_end_is_clamped() {
        let progress = CompetitionProgress::compute(&competition(10), date(2024, 1, 15));
        assert_eq!(progress.raw_day, 15);
        assert_eq!(progress.day, 10);
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.days_left, 0);
        assert!(progress.has_ended);
    }

    #[test]
    fn test_progress_first_day() {
        let progress = CompetitionProgress::compute(&competition(30), date(2024, 1, 1));
        assert_eq!(progress.day, 1);
        // 100 * 1 / 30 = 3.33
        assert_eq!(progress.percent, 3);
        assert_eq!(progress.days_left, 29);
    }

    #[test]
    fn test_progress_rounds_half_up() {
        // 100 * 1 / 8 = 12.5
        let progress = CompetitionProgress::compute(&competition(8), date(2024, 1, 1));
        assert_eq!(progress.percent, 13);
    }

    #[test]
    fn test_progress_before_start() {
        let progress = CompetitionProgress::compute(&competition(10), date(2023, 12, 29));
        assert_eq!(progress.raw_day, -2);
        assert_eq!(progress.day, 1);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.days_left, 10);
        assert!(!progress.has_started);
    }

    #[test]
    fn test_progress_across_month_and_leap_day() {
        let mut c = competition(60);
        c.start_date = date(2024, 2, 20);
        let progress = CompetitionProgress::compute(&c, date(2024, 3, 1));
        // Feb 20..=Mar 1 in a leap year is 11 days.
        assert_eq!(progress.day, 11);
    }

    #[test]
    fn test_end_date() {
        assert_eq!(competition(10).end_date(), date(2024, 1, 10));
        assert_eq!(competition(1).end_date(), date(2024, 1, 1));
    }

    #[test]
    fn test_huge_duration_does_not_overflow() {
        let c = competition(u32::MAX);
        assert_eq!(c.end_date(), NaiveDate::MAX);

        let progress = CompetitionProgress::compute(&c, date(2024, 1, 5));
        assert_eq!(progress.day, 5);
        assert_eq!(progress.percent, 0);
        assert!(!progress.has_ended);
    }
}
