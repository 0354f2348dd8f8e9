// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data management routes: export, import, and data file location.

use crate::error::Result;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/data/path", get(get_data_path))
        .route("/api/data/export", post(export_data))
        .route("/api/data/import", post(import_data))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DataPathResponse {
    pub data_dir: String,
    pub data_file: String,
    pub proofs_dir: String,
}

async fn get_data_path(State(state): State<Arc<AppState>>) -> Json<DataPathResponse> {
    Json(DataPathResponse {
        data_dir: state.config.data_dir.display().to_string(),
        data_file: state
            .competition
            .store()
            .data_file()
            .display()
            .to_string(),
        proofs_dir: state.proofs.proofs_dir().display().to_string(),
    })
}

#[derive(Deserialize, Validate)]
struct PathRequest {
    #[validate(length(min = 1))]
    path: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TransferResponse {
    pub success: bool,
    pub path: String,
    pub participant_count: usize,
    pub has_competition: bool,
}

/// Write a copy of the persisted document to a user-chosen path.
async fn export_data(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PathRequest>,
) -> Result<Json<TransferResponse>> {
    body.validate()?;
    let destination = PathBuf::from(&body.path);
    state.competition.export_document(&destination).await?;
    let doc = state.competition.snapshot().await;
    Ok(Json(TransferResponse {
        success: true,
        path: body.path,
        participant_count: doc.participants.len(),
        has_competition: doc.competition.is_some(),
    }))
}

/// Replace the active document with a previously exported one.
async fn import_data(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PathRequest>,
) -> Result<Json<TransferResponse>> {
    body.validate()?;
    let source = PathBuf::from(&body.path);
    let doc = state.competition.import_document(&source).await?;
    Ok(Json(TransferResponse {
        success: true,
        path: body.path,
        participant_count: doc.participants.len(),
        has_competition: doc.competition.is_some(),
    }))
}
