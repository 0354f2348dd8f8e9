// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the competition, participants, and scoreboard.

use crate::error::{AppError, Result};
use crate::models::participant::AVATARS;
use crate::models::{
    compute_stats, ActivityLog, Competition, CompetitionProgress, Participant, ParticipantStats,
    ProofInfo,
};
use crate::services::{
    leaders, rank, NewCompetition, NewParticipant, ParticipantSummary, ScoreboardEntry,
};
use crate::time_utils::local_today;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/avatars", get(get_avatars))
        .route("/api/points-preview", get(get_points_preview))
        .route(
            "/api/competition",
            get(get_competition)
                .post(create_competition)
                .delete(reset_competition),
        )
        .route("/api/dashboard", get(get_dashboard))
        .route(
            "/api/participants",
            get(list_participants).post(add_participant),
        )
        .route(
            "/api/participants/{id}",
            get(get_participant).delete(delete_participant),
        )
        .route("/api/scoreboard", get(get_scoreboard))
}

/// Generic acknowledgement for destructive operations.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

// ─── Reference Data ──────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AvatarsResponse {
    pub avatars: Vec<String>,
}

async fn get_avatars() -> Json<AvatarsResponse> {
    Json(AvatarsResponse {
        avatars: AVATARS.iter().map(|a| a.to_string()).collect(),
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsPreviewQuery {
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    water: bool,
    #[serde(default)]
    walk_with_friend: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PointsPreviewResponse {
    pub points: u32,
}

/// Points a single entry with these goals would score.
async fn get_points_preview(
    Query(params): Query<PointsPreviewQuery>,
) -> Json<PointsPreviewResponse> {
    let entry = ActivityLog {
        completed: params.completed,
        water: params.water,
        walk_with_friend: params.walk_with_friend,
        ..ActivityLog::new(local_today())
    };
    Json(PointsPreviewResponse {
        points: entry.points(),
    })
}

// ─── Competition ─────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompetitionResponse {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: u32,
    pub created_at: String,
    pub progress: CompetitionProgress,
}

impl CompetitionResponse {
    fn new(competition: Competition, today: NaiveDate) -> Self {
        let progress = CompetitionProgress::compute(&competition, today);
        Self {
            end_date: competition.end_date(),
            name: competition.name,
            start_date: competition.start_date,
            duration_days: competition.duration_days,
            created_at: competition.created_at,
            progress,
        }
    }
}

async fn get_competition(State(state): State<Arc<AppState>>) -> Result<Json<CompetitionResponse>> {
    let competition = state
        .competition
        .competition()
        .await
        .ok_or_else(|| AppError::NotFound("No competition has been started".to_string()))?;
    Ok(Json(CompetitionResponse::new(competition, local_today())))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateCompetitionRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(range(min = 1, max = 365))]
    duration_days: u32,
    start_date: Option<NaiveDate>,
}

async fn create_competition(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCompetitionRequest>,
) -> Result<(StatusCode, Json<CompetitionResponse>)> {
    body.validate()?;
    let today = local_today();
    let competition = state
        .competition
        .create_competition(
            NewCompetition {
                name: body.name,
                duration_days: body.duration_days,
                start_date: body.start_date,
            },
            today,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CompetitionResponse::new(competition, today)),
    ))
}

/// Delete the competition and every participant and log.
async fn reset_competition(State(state): State<Arc<AppState>>) -> Result<Json<DeleteResponse>> {
    state.competition.reset().await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Competition reset. All data has been removed.".to_string(),
    }))
}

// ─── Dashboard ───────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardResponse {
    pub competition: Option<CompetitionResponse>,
    pub leaders: Vec<ScoreboardEntry>,
    pub participant_count: usize,
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardResponse> {
    let today = local_today();
    let doc = state.competition.snapshot().await;
    Json(DashboardResponse {
        competition: doc
            .competition
            .map(|c| CompetitionResponse::new(c, today)),
        leaders: leaders(&doc.participants, today),
        participant_count: doc.participants.len(),
    })
}

// ─── Participants ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ParticipantCard {
    pub participant: ParticipantSummary,
    pub stats: ParticipantStats,
}

/// Participants in the order they were added, with their stats.
async fn list_participants(State(state): State<Arc<AppState>>) -> Json<Vec<ParticipantCard>> {
    let today = local_today();
    let cards = state
        .competition
        .participants()
        .await
        .iter()
        .map(|p| ParticipantCard {
            participant: ParticipantSummary::from(p),
            stats: compute_stats(p, today),
        })
        .collect();
    Json(cards)
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct AddParticipantRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    avatar: Option<String>,
    join_date: Option<NaiveDate>,
}

async fn add_participant(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddParticipantRequest>,
) -> Result<(StatusCode, Json<ParticipantSummary>)> {
    body.validate()?;
    let now_millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
    let participant = state
        .competition
        .add_participant(
            NewParticipant {
                name: body.name,
                avatar: body.avatar,
                join_date: body.join_date,
            },
            local_today(),
            now_millis,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ParticipantSummary::from(&participant)),
    ))
}

/// A log entry as shown in history views.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogView {
    #[serde(flatten)]
    pub log: ActivityLog,
    pub points: u32,
    pub proof_info: ProofInfo,
}

impl From<&ActivityLog> for LogView {
    fn from(log: &ActivityLog) -> Self {
        Self {
            points: log.points(),
            proof_info: log.proof_info(),
            log: log.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDetail {
    pub participant: ParticipantSummary,
    pub stats: ParticipantStats,
    pub has_optional_data: bool,
    /// Newest first
    pub logs: Vec<LogView>,
}

impl ParticipantDetail {
    pub fn new(participant: &Participant, today: NaiveDate) -> Self {
        let stats = compute_stats(participant, today);
        Self {
            participant: ParticipantSummary::from(participant),
            has_optional_data: stats.has_optional_data(),
            stats,
            logs: participant
                .logs_newest_first()
                .into_iter()
                .map(LogView::from)
                .collect(),
        }
    }
}

async fn get_participant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ParticipantDetail>> {
    let participant = state.competition.participant(id).await?;
    Ok(Json(ParticipantDetail::new(&participant, local_today())))
}

async fn delete_participant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    let removed = state.competition.delete_participant(id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: format!(
            "Deleted {} and {} log entries",
            removed.name,
            removed.logs.len()
        ),
    }))
}

// ─── Scoreboard ──────────────────────────────────────────────

async fn get_scoreboard(State(state): State<Arc<AppState>>) -> Json<Vec<ScoreboardEntry>> {
    let participants = state.competition.participants().await;
    Json(rank(&participants, local_today()))
}
