// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Whole-document JSON persistence.
//!
//! The competition lives in one JSON file that is rewritten in full on
//! every save. Loading never fails: a missing or unreadable document is
//! treated as an empty competition.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{AppError, Result};
use crate::models::CompetitionDocument;

/// File-backed store for the competition document.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_file: PathBuf,
}

impl JsonStore {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
        }
    }

    /// Location of the active document.
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Load the active document, falling back to an empty one.
    ///
    /// Damaged records are dropped individually. Whenever something could
    /// not be carried over, the file as found is kept beside the data file
    /// so the next save does not destroy it.
    pub async fn load(&self) -> CompetitionDocument {
        let raw = match fs::read(&self.data_file).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.data_file.display(),
                    "No competition document yet, starting empty"
                );
                return CompetitionDocument::default();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.data_file.display(),
                    error = %e,
                    "Competition document unreadable, starting empty"
                );
                return CompetitionDocument::default();
            }
        };

        match CompetitionDocument::from_json_lenient(&raw) {
            Ok((doc, report)) => {
                if report.lost_records() {
                    self.preserve_copy("recovered", &raw).await;
                }
                tracing::info!(
                    path = %self.data_file.display(),
                    participants = doc.participants.len(),
                    has_competition = doc.competition.is_some(),
                    repaired = report.repaired_fields,
                    dropped_logs = report.dropped_logs,
                    "Loaded competition document"
                );
                doc
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.data_file.display(),
                    error = %e,
                    "Competition document corrupt, starting empty"
                );
                self.preserve_copy("corrupt", &raw).await;
                CompetitionDocument::default()
            }
        }
    }

    /// Write `raw` next to the data file as `<name>.<tag>-<timestamp>`.
    async fn preserve_copy(&self, tag: &str, raw: &[u8]) {
        let name = self
            .data_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3fZ");
        let copy = self
            .data_file
            .with_file_name(format!("{}.{}-{}", name, tag, stamp));

        match fs::write(&copy, raw).await {
            Ok(()) => tracing::warn!(copy = %copy.display(), "Kept a copy of the damaged document"),
            Err(e) => tracing::error!(
                copy = %copy.display(),
                error = %e,
                "Failed to keep a copy of the damaged document"
            ),
        }
    }

    /// Overwrite the active document.
    pub async fn save(&self, doc: &CompetitionDocument) -> Result<()> {
        let json = serde_json::to_vec_pretty(doc)
            .map_err(|e| AppError::Persistence(format!("Failed to encode document: {}", e)))?;
        write_atomic(&self.data_file, &json)
            .await
            .map_err(|e| {
                AppError::Persistence(format!(
                    "Failed to write {}: {}",
                    self.data_file.display(),
                    e
                ))
            })?;
        tracing::debug!(path = %self.data_file.display(), bytes = json.len(), "Saved document");
        Ok(())
    }

    /// Copy the persisted document to `destination`.
    pub async fn export_document(&self, destination: &Path) -> Result<()> {
        let doc = self.load().await;
        let json = serde_json::to_vec_pretty(&doc)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode document: {}", e)))?;
        fs::write(destination, &json).await.map_err(|e| {
            AppError::ExternalResource(format!(
                "Failed to export to {}: {}",
                destination.display(),
                e
            ))
        })?;
        tracing::info!(path = %destination.display(), "Exported competition document");
        Ok(())
    }

    /// Replace the active document with the one at `source`.
    ///
    /// The source must parse; on any failure the active document is left
    /// untouched. Returns the normalized document that was saved.
    pub async fn import_document(&self, source: &Path) -> Result<CompetitionDocument> {
        let doc = match read_document(source).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                return Err(AppError::ExternalResource(format!(
                    "Import file {} does not exist",
                    source.display()
                )))
            }
            Err(e) => {
                return Err(AppError::ExternalResource(format!(
                    "Failed to import {}: {}",
                    source.display(),
                    e
                )))
            }
        };
        self.save(&doc).await?;
        tracing::info!(
            path = %source.display(),
            participants = doc.participants.len(),
            "Imported competition document"
        );
        Ok(doc)
    }
}

/// Read and parse a document; `Ok(None)` if the file does not exist.
async fn read_document(path: &Path) -> anyhow::Result<Option<CompetitionDocument>> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let (doc, report) = CompetitionDocument::from_json_lenient(&raw)?;
    if report.lost_records() {
        tracing::warn!(
            path = %path.display(),
            dropped_logs = report.dropped_logs,
            dropped_participants = report.dropped_participants,
            dropped_competition = report.dropped_competition,
            "Skipped unreadable records"
        );
    }
    Ok(Some(doc))
}

/// Write via a temporary sibling and rename, so a crash mid-write never
/// leaves a truncated document behind.
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).await?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let tmp = parent.join(format!(".{}.tmp.{}", file_name, std::process::id()));

    if let Err(e) = fs::write(&tmp, bytes).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}
