// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scoreboard ranking.
//!
//! Participants are ordered by total points, highest first. Ties keep the
//! order in which participants were added; there is no secondary
//! tie-break.

use chrono::NaiveDate;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{compute_stats, Participant, ParticipantStats};

/// Number of participants shown as current leaders.
pub const LEADER_COUNT: usize = 3;

/// Badge for the top three places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
}

impl RankBadge {
    pub fn for_rank(rank: u32) -> Option<Self> {
        match rank {
            1 => Some(RankBadge::Gold),
            2 => Some(RankBadge::Silver),
            3 => Some(RankBadge::Bronze),
            _ => None,
        }
    }
}

/// Identity fields of a participant, without their logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ParticipantSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub avatar: String,
    pub join_date: NaiveDate,
}

impl From<&Participant> for ParticipantSummary {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            avatar: p.avatar.clone(),
            join_date: p.join_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScoreboardEntry {
    /// 1-based position
    pub rank: u32,
    pub badge: Option<RankBadge>,
    pub participant: ParticipantSummary,
    pub stats: ParticipantStats,
}

/// Rank participants by points, highest first.
pub fn rank(participants: &[Participant], today: NaiveDate) -> Vec<ScoreboardEntry> {
    let mut scored: Vec<(ParticipantSummary, ParticipantStats)> = participants
        .iter()
        .map(|p| (ParticipantSummary::from(p), compute_stats(p, today)))
        .collect();

    // `sort_by` is stable, so equal scores keep insertion order.
    scored.sort_by(|a, b| b.1.total_points.cmp(&a.1.total_points));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (participant, stats))| {
            let rank = i as u32 + 1;
            ScoreboardEntry {
                rank,
                badge: RankBadge::for_rank(rank),
                participant,
                stats,
            }
        })
        .collect()
}

/// The current top of the scoreboard.
pub fn leaders(participants: &[Participant], today: NaiveDate) -> Vec<ScoreboardEntry> {
    let mut entries = rank(participants, today);
    entries.truncate(LEADER_COUNT);
    entries
}
