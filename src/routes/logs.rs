// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity logging and proof routes.

use crate::db::{ProofFile, StoredProof};
use crate::error::{AppError, Result};
use crate::models::activity::is_http_url;
use crate::models::{
    compute_stats, ActivityLog, MediaKind, ParticipantStats, Proof, ProofInfo, UpsertOutcome,
};
use crate::routes::api::LogView;
use crate::time_utils::{local_today, parse_date};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/participants/{id}/logs", put(log_activity))
        .route("/api/participants/{id}/proofs", post(upload_proof))
        .route(
            "/api/participants/{id}/logs/{date}/proof",
            get(get_log_proof),
        )
}

// ─── Log Activity ────────────────────────────────────────────

/// One day's submission. Everything omitted is reset for that day.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct LogActivityRequest {
    /// Defaults to today
    date: Option<NaiveDate>,
    #[serde(default)]
    completed: bool,
    /// Minutes, at most one day
    #[validate(range(max = 1440))]
    duration: Option<u32>,
    #[serde(default)]
    water: bool,
    #[serde(default)]
    walk_with_friend: bool,
    /// Pasted link (ignored when `proof_path` is set)
    #[validate(length(max = 2048))]
    proof_url: Option<String>,
    /// Path returned by the proof upload route
    proof_path: Option<String>,
    steps: Option<u64>,
    #[validate(range(min = 0.0))]
    distance: Option<f64>,
    #[validate(range(min = 0.0))]
    weight: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogActivityResponse {
    outcome: UpsertOutcome,
    entry: LogView,
    stats: ParticipantStats,
}

/// Resolve the submitted proof fields to a single proof.
///
/// An uploaded file wins over a pasted link.
async fn resolve_proof(
    state: &AppState,
    proof_path: Option<&str>,
    proof_url: Option<&str>,
) -> Result<Proof> {
    if let Some(path) = proof_path.map(str::trim).filter(|p| !p.is_empty()) {
        if !state.proofs.is_managed(path).await {
            return Err(AppError::Validation(
                "proofPath must be a file stored through the proof upload".to_string(),
            ));
        }
        let kind = MediaKind::from_path(path).ok_or_else(|| {
            AppError::Validation("proofPath is not a photo or video".to_string())
        })?;
        return Ok(Proof::UploadedFile {
            path: path.to_string(),
            kind,
        });
    }

    match proof_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) if is_http_url(url) => Ok(Proof::ExternalLink {
            url: url.to_string(),
        }),
        Some(_) => Err(AppError::Validation(
            "proofUrl must start with http:// or https://".to_string(),
        )),
        None => Ok(Proof::None),
    }
}

async fn log_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<LogActivityRequest>,
) -> Result<Json<LogActivityResponse>> {
    body.validate()?;
    let today = local_today();
    let proof = resolve_proof(
        &state,
        body.proof_path.as_deref(),
        body.proof_url.as_deref(),
    )
    .await?;

    let entry = ActivityLog {
        date: body.date.unwrap_or(today),
        completed: body.completed,
        duration: if body.completed {
            body.duration.unwrap_or(0)
        } else {
            0
        },
        water: body.water,
        walk_with_friend: body.walk_with_friend,
        proof,
        steps: body.steps,
        distance: body.distance,
        weight: body.weight,
    };

    if entry.completed && !entry.has_proof() {
        tracing::info!(participant_id = id, date = %entry.date, "Workout logged without proof");
    }

    let view = LogView::from(&entry);
    let kept_file = match &entry.proof {
        Proof::UploadedFile { path, .. } => Some(path.clone()),
        _ => None,
    };
    let outcome = state.competition.log_activity(id, entry).await?;

    // The day now points at the new file; older uploads for it can go.
    if let Some(path) = kept_file {
        if let Err(e) = state.proofs.prune_replaced(&path).await {
            tracing::warn!(participant_id = id, error = %e, "Failed to prune replaced proof");
        }
    }
    let participant = state.competition.participant(id).await?;

    Ok(Json(LogActivityResponse {
        outcome,
        entry: view,
        stats: compute_stats(&participant, today),
    }))
}

// ─── Proof Files ─────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UploadProofRequest {
    /// File chosen by the user
    #[validate(length(min = 1))]
    source_path: String,
    /// Day the proof is for; defaults to today
    date: Option<NaiveDate>,
}

/// Copy a user-selected file into the managed proofs folder.
///
/// The returned path is then submitted as `proofPath` when logging.
async fn upload_proof(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<UploadProofRequest>,
) -> Result<(StatusCode, Json<StoredProof>)> {
    body.validate()?;
    // Reject uploads for participants that do not exist.
    state.competition.participant(id).await?;

    let date = body.date.unwrap_or_else(local_today);
    let stored = state
        .proofs
        .store(std::path::Path::new(&body.source_path), id, date)
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogProofResponse {
    date: NaiveDate,
    proof_info: ProofInfo,
    /// External link, when the proof is one
    url: Option<String>,
    /// Stored file, when the proof is an upload
    file: Option<ProofFile>,
}

async fn get_log_proof(
    State(state): State<Arc<AppState>>,
    Path((id, date)): Path<(u64, String)>,
) -> Result<Json<LogProofResponse>> {
    let date = parse_date(&date)?;
    let participant = state.competition.participant(id).await?;
    let log = participant.log_for(date).ok_or_else(|| {
        AppError::NotFound(format!("No activity logged for participant {} on {}", id, date))
    })?;

    let (url, file) = match &log.proof {
        Proof::UploadedFile { path, .. } => (None, Some(state.proofs.read(path).await?)),
        Proof::ExternalLink { url } => (Some(url.clone()), None),
        Proof::None => (None, None),
    };

    Ok(Json(LogProofResponse {
        date,
        proof_info: log.proof_info(),
        url,
        file,
    }))
}
