// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod competition;
pub mod scoreboard;

pub use competition::{CompetitionService, NewCompetition, NewParticipant};
pub use scoreboard::{leaders, rank, ParticipantSummary, RankBadge, ScoreboardEntry};
