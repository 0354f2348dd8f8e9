// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Points, streaks, and per-participant statistics.
//!
//! Everything here is a pure function of a participant's logs and the
//! current local date; nothing is cached in the document.

use chrono::NaiveDate;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{ActivityLog, Participant};

/// Total points: one per completed workout, hydration day, and friend walk.
pub fn points(logs: &[ActivityLog]) -> u32 {
    logs.iter().map(ActivityLog::points).sum()
}

/// Consecutive days with a completed workout, ending today.
///
/// A missing entry for today means the streak is 0 even if yesterday was
/// part of a run.
pub fn streak(logs: &[ActivityLog], today: NaiveDate) -> u32 {
    let mut completed: Vec<NaiveDate> = logs
        .iter()
        .filter(|l| l.completed)
        .map(|l| l.date)
        .collect();
    completed.sort_by(|a, b| b.cmp(a));

    let mut count = 0;
    for (offset, date) in completed.into_iter().enumerate() {
        let expected = today.checked_sub_days(chrono::Days::new(offset as u64));
        if expected != Some(date) {
            break;
        }
        count += 1;
    }
    count
}

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Derived statistics for one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ParticipantStats {
    // ─── Score ───────────────────────────────────────────────────
    pub total_points: u32,
    pub streak_days: u32,

    // ─── Workouts ────────────────────────────────────────────────
    /// Days with a completed workout
    pub workout_days: u32,
    /// Minutes across completed workouts
    pub total_minutes: u32,
    /// Average minutes per workout day (rounded, 0 with no workouts)
    pub avg_minutes: u32,
    /// Workout days backed by a photo, video, or link
    pub proof_uploads: u32,
    /// Workout days without proof
    pub no_proof_days: u32,

    // ─── Bonus Goals ─────────────────────────────────────────────
    pub water_days: u32,
    pub friend_walks: u32,

    // ─── Optional Tracking ───────────────────────────────────────
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_steps: u64,
    /// Kilometers, one decimal
    pub total_distance: f64,
    /// First recorded weight in log order
    pub start_weight: Option<f64>,
    /// Last recorded weight in log order
    pub latest_weight: Option<f64>,
    /// `latest_weight - start_weight`, one decimal
    pub weight_change: Option<f64>,
}

impl ParticipantStats {
    pub fn from_logs(logs: &[ActivityLog], today: NaiveDate) -> Self {
        let workouts: Vec<&ActivityLog> = logs.iter().filter(|l| l.completed).collect();
        let workout_days = workouts.len() as u32;
        let total_minutes: u32 = workouts.iter().map(|l| l.counted_minutes()).sum();
        let proof_uploads = workouts.iter().filter(|l| l.has_proof()).count() as u32;

        let avg_minutes = if workout_days > 0 {
            // Integer round-half-up of total / days.
            ((2 * u64::from(total_minutes) + u64::from(workout_days))
                / (2 * u64::from(workout_days))) as u32
        } else {
            0
        };

        let weights: Vec<f64> = logs.iter().filter_map(|l| l.weight).collect();
        let start_weight = weights.first().copied();
        let latest_weight = weights.last().copied();
        let weight_change = match (start_weight, latest_weight) {
            (Some(start), Some(latest)) => Some(round1(latest - start)),
            _ => None,
        };

        Self {
            total_points: points(logs),
            streak_days: streak(logs, today),
            workout_days,
            total_minutes,
            avg_minutes,
            proof_uploads,
            no_proof_days: workout_days - proof_uploads,
            water_days: logs.iter().filter(|l| l.water).count() as u32,
            friend_walks: logs.iter().filter(|l| l.walk_with_friend).count() as u32,
            total_steps: logs.iter().filter_map(|l| l.steps).sum(),
            total_distance: round1(logs.iter().filter_map(|l| l.distance).sum()),
            start_weight,
            latest_weight,
            weight_change,
        }
    }

    /// Whether any of the optional tracking fields have data.
    pub fn has_optional_data(&self) -> bool {
        self.total_steps > 0 || self.total_distance > 0.0 || self.latest_weight.is_some()
    }
}

/// Statistics for `participant` as of `today`.
pub fn compute_stats(participant: &Participant, today: NaiveDate) -> ParticipantStats {
    ParticipantStats::from_logs(&participant.logs, today)
}
