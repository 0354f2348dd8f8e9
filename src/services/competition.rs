// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Competition state service.
//!
//! Owns the single in-memory competition document. Every mutation:
//! 1. Locks the document (one writer at a time)
//! 2. Applies the change to a copy
//! 3. Saves the copy as the whole document
//! 4. Commits the copy in memory only once the save succeeded
//!
//! A failed save therefore leaves both the file and the in-memory state as
//! they were.

use std::path::Path;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::db::JsonStore;
use crate::error::{AppError, Result};
use crate::models::participant::{is_known_avatar, random_avatar};
use crate::models::{
    ActivityLog, Competition, CompetitionDocument, CompetitionProgress, Participant, UpsertOutcome,
};
use crate::time_utils::format_utc_rfc3339;

/// Longest accepted competition or participant name, in characters.
pub const MAX_NAME_LEN: usize = 100;
/// Longest accepted competition duration.
pub const MAX_DURATION_DAYS: u32 = 365;

/// Input for starting a competition.
#[derive(Debug, Clone)]
pub struct NewCompetition {
    pub name: String,
    pub duration_days: u32,
    /// Defaults to today
    pub start_date: Option<NaiveDate>,
}

/// Input for adding a participant.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub name: String,
    /// Random palette entry when absent
    pub avatar: Option<String>,
    /// Defaults to today
    pub join_date: Option<NaiveDate>,
}

pub struct CompetitionService {
    store: JsonStore,
    doc: Mutex<CompetitionDocument>,
}

impl CompetitionService {
    /// Build the service from whatever the store currently holds.
    pub async fn load(store: JsonStore) -> Self {
        let doc = store.load().await;
        Self::with_document(store, doc)
    }

    pub fn with_document(store: JsonStore, doc: CompetitionDocument) -> Self {
        Self {
            store,
            doc: Mutex::new(doc),
        }
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    // ─── Queries ─────────────────────────────────────────────────

    /// A copy of the whole document.
    pub async fn snapshot(&self) -> CompetitionDocument {
        self.doc.lock().await.clone()
    }

    pub async fn competition(&self) -> Option<Competition> {
        self.doc.lock().await.competition.clone()
    }

    /// Progress as of `today`, if a competition exists.
    pub async fn progress(&self, today: NaiveDate) -> Option<CompetitionProgress> {
        self.doc
            .lock()
            .await
            .competition
            .as_ref()
            .map(|c| CompetitionProgress::compute(c, today))
    }

    /// Participants in insertion order.
    pub async fn participants(&self) -> Vec<Participant> {
        self.doc.lock().await.participants.clone()
    }

    pub async fn participant(&self, id: u64) -> Result<Participant> {
        self.doc
            .lock()
            .await
            .participant(id)
            .cloned()
            .ok_or_else(|| participant_not_found(id))
    }

    // ─── Mutations ───────────────────────────────────────────────

    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut CompetitionDocument) -> Result<T>,
    ) -> Result<T> {
        let mut doc = self.doc.lock().await;
        let mut next = doc.clone();
        let value = apply(&mut next)?;
        self.store.save(&next).await?;
        *doc = next;
        Ok(value)
    }

    /// Start the competition. Only one may exist until a reset.
    pub async fn create_competition(
        &self,
        new: NewCompetition,
        today: NaiveDate,
    ) -> Result<Competition> {
        let name = validate_name("Competition name", &new.name)?;
        if new.duration_days < 1 || new.duration_days > MAX_DURATION_DAYS {
            return Err(AppError::Validation(format!(
                "Duration must be between 1 and {} days",
                MAX_DURATION_DAYS
            )));
        }

        let competition = Competition {
            name,
            start_date: new.start_date.unwrap_or(today),
            duration_days: new.duration_days,
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        let created = competition.clone();
        self.mutate(move |doc| {
            if doc.competition.is_some() {
                return Err(AppError::Conflict(
                    "A competition is already running; reset it first".to_string(),
                ));
            }
            doc.competition = Some(competition);
            Ok(())
        })
        .await?;

        tracing::info!(
            name = %created.name,
            start_date = %created.start_date,
            duration_days = created.duration_days,
            "Competition created"
        );
        Ok(created)
    }

    /// Add a participant; the id is derived from `now_millis`.
    pub async fn add_participant(
        &self,
        new: NewParticipant,
        today: NaiveDate,
        now_millis: u64,
    ) -> Result<Participant> {
        let name = validate_name("Participant name", &new.name)?;
        let avatar = match new.avatar.as_deref().map(str::trim) {
            None | Some("") => random_avatar().to_string(),
            Some(a) if is_known_avatar(a) => a.to_string(),
            Some(a) => {
                return Err(AppError::Validation(format!(
                    "Avatar '{}' is not in the palette",
                    a
                )))
            }
        };
        let join_date = new.join_date.unwrap_or(today);

        let participant = self
            .mutate(move |doc| {
                let id = doc.next_participant_id(now_millis);
                let participant = Participant::new(id, name, avatar, join_date);
                doc.participants.push(participant.clone());
                Ok(participant)
            })
            .await?;

        tracing::info!(
            participant_id = participant.id,
            name = %participant.name,
            "Participant added"
        );
        Ok(participant)
    }

    /// Delete a participant together with all of their logs.
    pub async fn delete_participant(&self, id: u64) -> Result<Participant> {
        let removed = self
            .mutate(|doc| {
                doc.remove_participant(id)
                    .ok_or_else(|| participant_not_found(id))
            })
            .await?;

        tracing::info!(
            participant_id = id,
            logs = removed.logs.len(),
            "Participant deleted"
        );
        Ok(removed)
    }

    /// Record `entry` for its date, replacing any entry already logged that day.
    ///
    /// The whole entry is replaced; callers carry forward any fields they
    /// want to keep.
    pub async fn log_activity(
        &self,
        participant_id: u64,
        entry: ActivityLog,
    ) -> Result<UpsertOutcome> {
        validate_log(&entry)?;
        let date = entry.date;
        let points = entry.points();

        let outcome = self
            .mutate(|doc| {
                let participant = doc
                    .participant_mut(participant_id)
                    .ok_or_else(|| participant_not_found(participant_id))?;
                Ok(participant.upsert_log(entry))
            })
            .await?;

        tracing::info!(
            participant_id,
            date = %date,
            points,
            outcome = ?outcome,
            "Activity logged"
        );
        Ok(outcome)
    }

    /// Remove the competition, every participant, and every log.
    pub async fn reset(&self) -> Result<()> {
        self.mutate(|doc| {
            *doc = CompetitionDocument::default();
            Ok(())
        })
        .await?;
        tracing::warn!("Competition reset; all data cleared");
        Ok(())
    }

    // ─── Import / Export ─────────────────────────────────────────

    /// Replace the active document with the one at `source`.
    pub async fn import_document(&self, source: &Path) -> Result<CompetitionDocument> {
        let mut doc = self.doc.lock().await;
        let imported = self.store.import_document(source).await?;
        *doc = imported.clone();
        Ok(imported)
    }

    /// Copy the persisted document to `destination`.
    pub async fn export_document(&self, destination: &Path) -> Result<()> {
        let _doc = self.doc.lock().await;
        self.store.export_document(destination).await
    }
}

fn participant_not_found(id: u64) -> AppError {
    AppError::NotFound(format!("Participant {} not found", id))
}

/// Trim `raw` and check it is a usable name.
fn validate_name(what: &str, raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", what)));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            what, MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn validate_log(entry: &ActivityLog) -> Result<()> {
    for (field, value) in [("distance", entry.distance), ("weight", entry.weight)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(AppError::Validation(format!(
                    "{} must be a non-negative number",
                    field
                )));
            }
        }
    }
    if !entry.completed && entry.duration != 0 {
        return Err(AppError::Validation(
            "Duration is only recorded for completed workouts".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    async fn service() -> (CompetitionService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("fitness-data.json"));
        (CompetitionService::load(store).await, dir)
    }

    fn new_participant(name: &str) -> NewParticipant {
        NewParticipant {
            name: name.to_string(),
            avatar: None,
            join_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_competition_defaults_start_to_today() {
        let (svc, _dir) = service().await;
        let created = svc
            .create_competition(
                NewCompetition {
                    name: "  March Madness ".to_string(),
                    duration_days: 31,
                    start_date: None,
                },
                day(1),
            )
            .await
            .unwrap();
        assert_eq!(created.name, "March Madness");
        assert_eq!(created.start_date, day(1));
        assert_eq!(svc.store().load().await.competition, Some(created));
    }

    #[tokio::test]
    async fn test_create_competition_validation() {
        let (svc, _dir) = service().await;
        let empty = NewCompetition {
            name: "   ".to_string(),
            duration_days: 10,
            start_date: None,
        };
        assert!(matches!(
            svc.create_competition(empty, day(1)).await,
            Err(AppError::Validation(_))
        ));
        let zero = NewCompetition {
            name: "X".to_string(),
            duration_days: 0,
            start_date: None,
        };
        assert!(matches!(
            svc.create_competition(zero, day(1)).await,
            Err(AppError::Validation(_))
        ));
        assert!(svc.competition().await.is_none());
    }

    #[tokio::test]
    async fn test_second_competition_conflicts() {
        let (svc, _dir) = service().await;
        let new = NewCompetition {
            name: "One".to_string(),
            duration_days: 10,
            start_date: None,
        };
        svc.create_competition(new.clone(), day(1)).await.unwrap();
        assert!(matches!(
            svc.create_competition(new, day(2)).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_add_participant_assigns_unique_ids() {
        let (svc, _dir) = service().await;
        let a = svc
            .add_participant(new_participant("A"), day(1), 1_000)
            .await
            .unwrap();
        let b = svc
            .add_participant(new_participant("B"), day(1), 1_000)
            .await
            .unwrap();
        assert_eq!(a.id, 1_000);
        assert_eq!(b.id, 1_001);
        assert!(is_known_avatar(&a.avatar));
        assert_eq!(a.join_date, day(1));
    }

    #[tokio::test]
    async fn test_add_participant_rejects_unknown_avatar() {
        let (svc, _dir) = service().await;
        let result = svc
            .add_participant(
                NewParticipant {
                    avatar: Some("🦄".to_string()),
                    ..new_participant("A")
                },
                day(1),
                1,
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(svc.participants().await.is_empty());
    }

    #[tokio::test]
    async fn test_log_activity_unknown_participant_is_not_found() {
        let (svc, _dir) = service().await;
        let result = svc.log_activity(42, ActivityLog::new(day(1))).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_log_activity_upserts_and_persists() {
        let (svc, _dir) = service().await;
        let p = svc
            .add_participant(new_participant("A"), day(1), 1)
            .await
            .unwrap();

        let first = ActivityLog {
            completed: true,
            duration: 30,
            ..ActivityLog::new(day(2))
        };
        let second = ActivityLog {
            water: true,
            ..ActivityLog::new(day(2))
        };
        assert_eq!(
            svc.log_activity(p.id, first).await.unwrap(),
            UpsertOutcome::Inserted
        );
        assert_eq!(
            svc.log_activity(p.id, second.clone()).await.unwrap(),
            UpsertOutcome::Replaced
        );

        let stored = svc.store().load().await;
        assert_eq!(stored.participant(p.id).unwrap().logs, vec![second]);
    }

    #[tokio::test]
    async fn test_log_activity_rejects_negative_weight() {
        let (svc, _dir) = service().await;
        let p = svc
            .add_participant(new_participant("A"), day(1), 1)
            .await
            .unwrap();
        let result = svc
            .log_activity(
                p.id,
                ActivityLog {
                    weight: Some(-3.0),
                    ..ActivityLog::new(day(1))
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_participant_removes_logs() {
        let (svc, _dir) = service().await;
        let p = svc
            .add_participant(new_participant("A"), day(1), 1)
            .await
            .unwrap();
        svc.log_activity(p.id, ActivityLog::new(day(1))).await.unwrap();

        let removed = svc.delete_participant(p.id).await.unwrap();
        assert_eq!(removed.logs.len(), 1);
        assert!(matches!(
            svc.participant(p.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete_participant(p.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let (svc, _dir) = service().await;
        svc.create_competition(
            NewCompetition {
                name: "C".to_string(),
                duration_days: 5,
                start_date: None,
            },
            day(1),
        )
        .await
        .unwrap();
        let p = svc
            .add_participant(new_participant("A"), day(1), 1)
            .await
            .unwrap();
        svc.log_activity(p.id, ActivityLog::new(day(1))).await.unwrap();

        svc.reset().await.unwrap();

        assert_eq!(svc.snapshot().await, CompetitionDocument::default());
        assert_eq!(svc.store().load().await, CompetitionDocument::default());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        tokio::fs::write(&blocker, b"x").await.unwrap();
        let store = JsonStore::new(blocker.join("fitness-data.json"));
        let svc = CompetitionService::with_document(store, CompetitionDocument::default());

        let result = svc.add_participant(new_participant("A"), day(1), 1).await;

        assert!(matches!(result, Err(AppError::Persistence(_))));
        assert!(svc.participants().await.is_empty());
    }
}
