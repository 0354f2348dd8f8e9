// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Participant model and the one-entry-per-day log upsert.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::ActivityLog;
use crate::time_utils::local_today;

/// Avatar palette offered when adding a participant.
pub const AVATARS: &[&str] = &[
    "🏃‍♀️", "🏃", "💪", "🧘‍♀️", "🧘", "🚴‍♀️", "🚴", "🏋️‍♀️", "🏋️", "⛹️‍♀️", "⛹️", "🤸‍♀️", "🏊‍♀️", "🏊",
    "🧗‍♀️", "🧗",
];

/// Uniformly random pick from the avatar palette.
pub fn random_avatar() -> &'static str {
    AVATARS[rand::rng().random_range(0..AVATARS.len())]
}

pub fn is_known_avatar(avatar: &str) -> bool {
    AVATARS.contains(&avatar)
}

/// A competitor and their activity history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Creation timestamp in milliseconds, unique within the document
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default = "local_today")]
    pub join_date: NaiveDate,
    /// One entry per date, in the order they were first logged
    #[serde(default)]
    pub logs: Vec<ActivityLog>,
}

/// What a log upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

impl Participant {
    pub fn new(id: u64, name: String, avatar: String, join_date: NaiveDate) -> Self {
        Self {
            id,
            name,
            avatar,
            join_date,
            logs: Vec::new(),
        }
    }

    /// The entry logged for `date`, if any.
    pub fn log_for(&self, date: NaiveDate) -> Option<&ActivityLog> {
        self.logs.iter().find(|l| l.date == date)
    }

    /// Insert `entry`, or replace the whole entry already logged for its date.
    ///
    /// A replaced entry keeps its position so first/latest weight ordering
    /// is unaffected by corrections.
    pub fn upsert_log(&mut self, entry: ActivityLog) -> UpsertOutcome {
        match self.logs.iter_mut().find(|l| l.date == entry.date) {
            Some(existing) => {
                *existing = entry;
                UpsertOutcome::Replaced
            }
            None => {
                self.logs.push(entry);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Collapse duplicate dates by replaying the logs as upserts.
    ///
    /// Returns the number of entries that were folded into an earlier one.
    pub fn dedupe_logs(&mut self) -> usize {
        let logs = std::mem::take(&mut self.logs);
        let mut folded = 0;
        for log in logs {
            if self.upsert_log(log) == UpsertOutcome::Replaced {
                folded += 1;
            }
        }
        folded
    }

    /// Logs sorted newest first, for history views.
    pub fn logs_newest_first(&self) -> Vec<&ActivityLog> {
        let mut logs: Vec<&ActivityLog> = self.logs.iter().collect();
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        logs
    }
}
