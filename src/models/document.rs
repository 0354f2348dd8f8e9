// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! The single competition document persisted as JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ActivityLog, Competition, Participant};

/// Everything the application stores: at most one competition and its
/// participants (each owning their logs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionDocument {
    #[serde(default)]
    pub competition: Option<Competition>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

/// What had to be repaired or dropped while reading a stored document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub repaired_fields: usize,
    pub dropped_logs: usize,
    pub dropped_participants: usize,
    pub dropped_competition: bool,
}

impl RecoveryReport {
    /// Whether any stored record could not be carried over.
    pub fn lost_records(&self) -> bool {
        self.dropped_logs > 0 || self.dropped_participants > 0 || self.dropped_competition
    }
}

impl CompetitionDocument {
    /// Read a stored document record by record.
    ///
    /// Only input that is not a JSON object fails. Damaged fields are
    /// repaired where a sensible value exists; records that still do not
    /// parse are dropped one at a time with a warning. Duplicate dates are
    /// folded as in [`normalize`](Self::normalize).
    pub fn from_json_lenient(raw: &[u8]) -> anyhow::Result<(Self, RecoveryReport)> {
        let Value::Object(mut root) = serde_json::from_slice::<Value>(raw)? else {
            anyhow::bail!("document is not a JSON object");
        };
        let mut report = RecoveryReport::default();

        let competition = match root.remove("competition") {
            None | Some(Value::Null) => None,
            Some(raw) => read_competition(raw, &mut report),
        };

        let participants = match root.remove("participants") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| read_participant(item, &mut report))
                .collect(),
            Some(_) => {
                tracing::warn!("Participant list is not an array, ignoring it");
                report.dropped_participants += 1;
                Vec::new()
            }
        };

        let mut doc = Self {
            competition,
            participants,
        };
        doc.normalize();
        Ok((doc, report))
    }

    /// Repair invariants that older documents may violate.
    ///
    /// Returns the number of duplicate-date log entries that were folded.
    pub fn normalize(&mut self) -> usize {
        let mut folded = 0;
        for participant in &mut self.participants {
            let n = participant.dedupe_logs();
            if n > 0 {
                tracing::warn!(
                    participant_id = participant.id,
                    duplicates = n,
                    "Collapsed duplicate log dates"
                );
            }
            folded += n;
        }
        folded
    }

    pub fn participant(&self, id: u64) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: u64) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// Id for a participant created at `now_millis`.
    ///
    /// Creation time is normally unique; if the clock has not moved past
    /// the newest id, the next integer is used instead.
    pub fn next_participant_id(&self, now_millis: u64) -> u64 {
        let max_id = self.participants.iter().map(|p| p.id).max().unwrap_or(0);
        now_millis.max(max_id + 1)
    }

    /// Remove a participant and all of their logs.
    pub fn remove_participant(&mut self, id: u64) -> Option<Participant> {
        let index = self.participants.iter().position(|p| p.id == id)?;
        Some(self.participants.remove(index))
    }
}

/// Duration as stored by older versions, which did not validate it.
fn repair_duration(value: &Value) -> u32 {
    let days = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match days {
        Some(d) if d.is_finite() => d.round().clamp(1.0, f64::from(u32::MAX)) as u32,
        _ => 1,
    }
}

fn read_competition(mut raw: Value, report: &mut RecoveryReport) -> Option<Competition> {
    if let Some(stored) = raw.get_mut("durationDays") {
        let days = repair_duration(stored);
        if *stored != Value::from(days) {
            tracing::warn!(stored = %stored, repaired = days, "Repaired competition duration");
            report.repaired_fields += 1;
            *stored = Value::from(days);
        }
    }

    match serde_json::from_value(raw) {
        Ok(competition) => Some(competition),
        Err(e) => {
            tracing::warn!(error = %e, "Dropping unreadable competition");
            report.dropped_competition = true;
            None
        }
    }
}

fn read_participant(mut raw: Value, report: &mut RecoveryReport) -> Option<Participant> {
    let stored_logs = match raw.as_object_mut() {
        Some(fields) => {
            // Optional fields fall back to their defaults when unusable.
            let bad_join = fields
                .get("joinDate")
                .is_some_and(|v| v.as_str().and_then(|s| s.parse::<NaiveDate>().ok()).is_none());
            if bad_join {
                fields.remove("joinDate");
                report.repaired_fields += 1;
            }
            if fields.get("avatar").is_some_and(|v| !v.is_string()) {
                fields.remove("avatar");
                report.repaired_fields += 1;
            }
            match fields.remove("logs") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            }
        }
        None => Vec::new(),
    };

    let mut participant: Participant = match serde_json::from_value(raw) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(
                error = %e,
                logs = stored_logs.len(),
                "Dropping unreadable participant"
            );
            report.dropped_participants += 1;
            return None;
        }
    };

    for item in stored_logs {
        match serde_json::from_value::<ActivityLog>(item) {
            Ok(log) => participant.logs.push(log),
            Err(e) => {
                tracing::warn!(
                    participant_id = participant.id,
                    error = %e,
                    "Dropping unreadable log entry"
                );
                report.dropped_logs += 1;
            }
        }
    }
    Some(participant)
}
