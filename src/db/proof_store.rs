// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Managed folder for uploaded proof files.
//!
//! Uploads are copied to `proof_<participant>_<date>.<ext>`, so uploading
//! again for the same participant and day replaces the earlier file.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde::Serialize;
use tokio::fs;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::models::MediaKind;
use crate::time_utils::DATE_FORMAT;

/// Result of copying a proof file into the managed folder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StoredProof {
    pub path: String,
    pub kind: MediaKind,
    pub file_name: String,
}

/// A stored proof file read back for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProofFile {
    pub path: String,
    pub kind: MediaKind,
    pub mime_type: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub size_bytes: u64,
    /// Inline `data:` URL for photos; videos are opened externally
    pub data_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProofStore {
    proofs_dir: PathBuf,
}

impl ProofStore {
    pub fn new(proofs_dir: impl Into<PathBuf>) -> Self {
        Self {
            proofs_dir: proofs_dir.into(),
        }
    }

    pub fn proofs_dir(&self) -> &Path {
        &self.proofs_dir
    }

    fn file_stem(participant_id: u64, date: NaiveDate) -> String {
        format!("proof_{}_{}", participant_id, date.format(DATE_FORMAT))
    }

    /// Copy `source` into the managed folder for `participant_id` on `date`.
    pub async fn store(
        &self,
        source: &Path,
        participant_id: u64,
        date: NaiveDate,
    ) -> Result<StoredProof> {
        let source_str = source.to_string_lossy();
        let kind = MediaKind::from_path(&source_str).ok_or_else(|| {
            AppError::Validation(format!(
                "Unsupported proof file type: {} (expected a photo or video)",
                source.display()
            ))
        })?;

        let metadata = fs::metadata(source).await.map_err(|e| {
            AppError::ExternalResource(format!("Cannot read {}: {}", source.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(AppError::ExternalResource(format!(
                "{} is not a file",
                source.display()
            )));
        }

        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let stem = Self::file_stem(participant_id, date);
        let file_name = format!("{}.{}", stem, ext);

        fs::create_dir_all(&self.proofs_dir)
            .await
            .map_err(|e| self.io_error("create proofs folder", e))?;

        let destination = self.proofs_dir.join(&file_name);
        fs::copy(source, &destination)
            .await
            .map_err(|e| self.io_error("copy proof file", e))?;
        let destination = fs::canonicalize(&destination)
            .await
            .unwrap_or(destination);

        tracing::info!(
            participant_id,
            date = %date,
            kind = kind.as_tag(),
            path = %destination.display(),
            "Stored proof file"
        );

        Ok(StoredProof {
            path: destination.to_string_lossy().to_string(),
            kind,
            file_name,
        })
    }

    /// Remove uploads for the same participant and day as `kept_path`
    /// that used a different extension.
    ///
    /// Only call this once a log referencing `kept_path` is committed; until
    /// then the older file may still be the one a log points at.
    pub async fn prune_replaced(&self, kept_path: &str) -> Result<usize> {
        let Some(keep) = Path::new(kept_path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
        else {
            return Ok(0);
        };
        let Some((stem, _)) = keep.rsplit_once('.') else {
            return Ok(0);
        };
        let prefix = format!("{}.", stem);

        let mut entries = fs::read_dir(&self.proofs_dir)
            .await
            .map_err(|e| self.io_error("list proofs folder", e))?;
        let mut removed = 0;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.io_error("list proofs folder", e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&prefix) && name != keep {
                tracing::debug!(file = %name, "Removing replaced proof file");
                fs::remove_file(entry.path())
                    .await
                    .map_err(|e| self.io_error("remove replaced proof", e))?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Whether `path` names an existing file inside the managed folder.
    pub async fn is_managed(&self, path: &str) -> bool {
        let (Ok(root), Ok(target)) = (
            fs::canonicalize(&self.proofs_dir).await,
            fs::canonicalize(path).await,
        ) else {
            return false;
        };
        target.starts_with(&root) && target.is_file()
    }

    /// Read a stored proof for display.
    pub async fn read(&self, path: &str) -> Result<ProofFile> {
        if !self.is_managed(path).await {
            return Err(AppError::NotFound(format!("Proof file {}", path)));
        }
        let kind = MediaKind::from_path(path).unwrap_or(MediaKind::Photo);
        let mime_type = mime_type_for(path).to_string();

        let (size_bytes, data_url) = match kind {
            MediaKind::Photo => {
                let bytes = fs::read(path)
                    .await
                    .map_err(|e| self.io_error("read proof file", e))?;
                let encoded = STANDARD.encode(&bytes);
                (
                    bytes.len() as u64,
                    Some(format!("data:{};base64,{}", mime_type, encoded)),
                )
            }
            MediaKind::Video => {
                let metadata = fs::metadata(path)
                    .await
                    .map_err(|e| self.io_error("read proof file", e))?;
                (metadata.len(), None)
            }
        };

        Ok(ProofFile {
            path: path.to_string(),
            kind,
            mime_type,
            size_bytes,
            data_url,
        })
    }

    fn io_error(&self, action: &str, e: std::io::Error) -> AppError {
        AppError::ExternalResource(format!(
            "Failed to {} in {}: {}",
            action,
            self.proofs_dir.display(),
            e
        ))
    }
}

/// MIME type for a proof file, by extension.
fn mime_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}
