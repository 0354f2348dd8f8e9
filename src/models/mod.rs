// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models and scoring for the competition.

pub mod activity;
pub mod competition;
pub mod document;
pub mod participant;
pub mod stats;

pub use activity::{ActivityLog, MediaKind, Proof, ProofInfo, ProofKind};
pub use competition::{Competition, CompetitionProgress};
pub use document::{CompetitionDocument, RecoveryReport};
pub use participant::{Participant, UpsertOutcome, AVATARS};
pub use stats::{compute_stats, points, streak, ParticipantStats};
