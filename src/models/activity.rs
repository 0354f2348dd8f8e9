// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Daily activity log entries and proof-of-activity classification.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// File extensions accepted as photo proof.
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
/// File extensions accepted as video proof.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Coarse media type of an uploaded proof file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Classify a file by its extension (case-insensitive).
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = std::path::Path::new(path)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Photo)
        } else {
            None
        }
    }

    /// Tag stored in the document's `proof` field for uploaded files.
    pub fn as_tag(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "photo" => Some(MediaKind::Photo),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// Proof attached to a log entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Proof {
    #[default]
    None,
    /// A file copied into the managed proofs folder.
    UploadedFile { path: String, kind: MediaKind },
    /// A pasted http(s) link.
    ExternalLink { url: String },
}

impl Proof {
    /// Build a proof from the stored `proof`/`proofPath` pair.
    ///
    /// Older documents hold several shapes: bare tags, `"none"`, empty
    /// strings, free text, and tags whose file was never recorded. Only a
    /// recorded file or an http(s) link survive as proof.
    pub fn from_stored(proof: Option<&str>, proof_path: Option<&str>) -> Self {
        let tag = proof.map(str::trim).filter(|p| !p.is_empty());

        if let Some(path) = proof_path.map(str::trim).filter(|p| !p.is_empty()) {
            let kind = MediaKind::from_path(path)
                .or_else(|| tag.and_then(MediaKind::from_tag))
                .unwrap_or(MediaKind::Photo);
            return Proof::UploadedFile {
                path: path.to_string(),
                kind,
            };
        }

        match tag {
            Some(url) if is_http_url(url) => Proof::ExternalLink {
                url: url.to_string(),
            },
            _ => Proof::None,
        }
    }

    /// Split back into the stored `(proof, proofPath)` pair.
    fn to_stored(&self) -> (Option<String>, Option<String>) {
        match self {
            Proof::None => (None, None),
            Proof::UploadedFile { path, kind } => {
                (Some(kind.as_tag().to_string()), Some(path.clone()))
            }
            Proof::ExternalLink { url } => (Some(url.clone()), None),
        }
    }
}

/// Whether `value` starts with an http or https scheme.
pub fn is_http_url(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Display classification of a log's proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ProofKind {
    None,
    Photo,
    Video,
    Youtube,
    Drive,
    Link,
}

impl ProofKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProofKind::None => "No proof",
            ProofKind::Photo => "Photo",
            ProofKind::Video => "Video",
            ProofKind::Youtube => "YouTube",
            ProofKind::Drive => "Drive",
            ProofKind::Link => "Link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProofInfo {
    pub kind: ProofKind,
    pub label: String,
    pub viewable: bool,
}

impl ProofInfo {
    fn new(kind: ProofKind) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            viewable: kind != ProofKind::None,
        }
    }
}

/// One participant's activity for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredActivityLog", into = "StoredActivityLog")]
pub struct ActivityLog {
    /// Natural key within a participant's logs
    pub date: NaiveDate,
    /// Did a workout
    pub completed: bool,
    /// Workout minutes (0 unless `completed`)
    pub duration: u32,
    /// Hydration bonus goal
    pub water: bool,
    /// Walk-with-a-friend bonus goal
    pub walk_with_friend: bool,
    pub proof: Proof,
    pub steps: Option<u64>,
    /// Kilometers
    pub distance: Option<f64>,
    /// User-chosen unit
    pub weight: Option<f64>,
}

impl ActivityLog {
    /// An empty entry for `date` with every field at its default.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            completed: false,
            duration: 0,
            water: false,
            walk_with_friend: false,
            proof: Proof::None,
            steps: None,
            distance: None,
            weight: None,
        }
    }

    /// Points scored by this entry: one per goal met.
    pub fn points(&self) -> u32 {
        u32::from(self.completed) + u32::from(self.water) + u32::from(self.walk_with_friend)
    }

    /// Minutes that count toward workout stats.
    pub fn counted_minutes(&self) -> u32 {
        if self.completed {
            self.duration
        } else {
            0
        }
    }

    /// Classify this entry's proof.
    ///
    /// An uploaded file wins over a link; the link host only changes how it
    /// is displayed.
    pub fn proof_info(&self) -> ProofInfo {
        let kind = match &self.proof {
            Proof::UploadedFile { path, kind } => {
                match MediaKind::from_path(path).unwrap_or(*kind) {
                    MediaKind::Photo => ProofKind::Photo,
                    MediaKind::Video => ProofKind::Video,
                }
            }
            Proof::ExternalLink { url } if is_http_url(url) => {
                if url.contains("youtube") || url.contains("youtu.be") {
                    ProofKind::Youtube
                } else if url.contains("drive.google") {
                    ProofKind::Drive
                } else {
                    ProofKind::Link
                }
            }
            _ => ProofKind::None,
        };
        ProofInfo::new(kind)
    }

    pub fn has_proof(&self) -> bool {
        self.proof_info().kind != ProofKind::None
    }
}

/// Document representation of a log entry.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredActivityLog {
    date: NaiveDate,
    #[serde(default)]
    completed: bool,
    #[serde(default, deserialize_with = "lenient_whole_number")]
    duration: Option<u64>,
    #[serde(default)]
    proof: Option<String>,
    #[serde(default)]
    proof_path: Option<String>,
    #[serde(default)]
    water: bool,
    #[serde(default)]
    walk_with_friend: bool,
    #[serde(
        default,
        deserialize_with = "lenient_whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    steps: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    distance: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    weight: Option<f64>,
}

/// Accept a JSON number or a numeric string; anything else reads as absent.
///
/// Form inputs in older documents were sometimes stored as `""`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Like `lenient_number`, for whole-number fields.
///
/// Negative and non-finite values are dropped; fractions are rounded.
fn lenient_whole_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64))
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

impl From<StoredActivityLog> for ActivityLog {
    fn from(stored: StoredActivityLog) -> Self {
        let duration = if stored.completed {
            stored
                .duration
                .map(|d| u32::try_from(d).unwrap_or(u32::MAX))
                .unwrap_or(0)
        } else {
            0
        };

        Self {
            date: stored.date,
            completed: stored.completed,
            duration,
            water: stored.water,
            walk_with_friend: stored.walk_with_friend,
            proof: Proof::from_stored(stored.proof.as_deref(), stored.proof_path.as_deref()),
            steps: stored.steps,
            distance: non_negative(stored.distance),
            weight: non_negative(stored.weight),
        }
    }
}

impl From<ActivityLog> for StoredActivityLog {
    fn from(log: ActivityLog) -> Self {
        let (proof, proof_path) = log.proof.to_stored();
        Self {
            date: log.date,
            completed: log.completed,
            duration: Some(u64::from(log.duration)),
            proof,
            proof_path,
            water: log.water,
            walk_with_friend: log.walk_with_friend,
            steps: log.steps,
            distance: log.distance,
            weight: log.weight,
        }
    }
}
