use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use crate::catalog::error::{CatalogError, ImportError};
use crate::catalog::language::{resolve_language, Language};
use crate::catalog::model::{
    new_record_id, ActivityLogEntry, CatalogState, FileInput, FileRecord, NoteInput, NoteRecord,
    PaperInput, PaperKind, PaperRecord, ResourceType, UploadInput, UploadedFile, VideoInput,
    VideoRecord,
};
use crate::catalog::page::{build_grade_page, GradePageData};
use crate::catalog::snapshot::{self, ImportReport};
use crate::catalog::stats::{compute_stats, Stats};
use crate::catalog::seed;
use crate::constants::{ACTIVITY_LOG_CAP, MSG_DATA_IMPORTED, TERM_KEYS, UNKNOWN_SCHOOL};
use crate::store::{PersistenceGateway, StoreError};

/// Owner of the canonical catalog state.
///
/// Readers get an `Arc` snapshot that never changes under them. Every
/// mutation validates and builds the next state on a private copy, then swaps
/// it in as one step, so a failed mutation leaves nothing behind. The new
/// state is handed to the gateway afterwards; a failed save is logged and
/// remembered but does not undo the mutation.
pub struct CatalogStore {
    gateway: Arc<dyn PersistenceGateway>,
    state: OnceCell<RwLock<Arc<CatalogState>>>,
    last_save_failed: AtomicBool,
}

impl CatalogStore {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            gateway,
            state: OnceCell::new(),
            last_save_failed: AtomicBool::new(false),
        }
    }

    /// Loads the saved catalog, or seeds and saves the default one when
    /// nothing is stored. Safe to call repeatedly and from several threads:
    /// only the first call touches storage, the rest wait for it.
    pub fn initialize(&self) -> Arc<CatalogState> {
        self.snapshot()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// Flushes the gateway. The store is consumed; readers still holding a
    /// snapshot keep it.
    pub fn teardown(self) -> Result<(), StoreError> {
        tracing::info!("Tearing down catalog store");
        self.gateway.flush()
    }

    pub fn snapshot(&self) -> Arc<CatalogState> {
        Arc::clone(&self.read())
    }

    /// False when the most recent save after a mutation failed.
    pub fn persistence_healthy(&self) -> bool {
        !self.last_save_failed.load(Ordering::Relaxed)
    }

    pub fn grade_page(&self, grade_id: &str) -> Option<GradePageData> {
        build_grade_page(&self.snapshot(), grade_id)
    }

    pub fn stats(&self) -> Stats {
        compute_stats(&self.snapshot())
    }

    pub fn add_textbook(
        &self,
        grade_id: &str,
        subject_id: &str,
        medium: &str,
        file: FileInput,
    ) -> Result<FileRecord, CatalogError> {
        let medium: Language = medium.trim().parse()?;
        self.commit("add_textbook", |state, now| {
            let (grade_display, subject_name) = ensure_pair(state, grade_id, subject_id)?;
            let record = file.into_record(medium, now);
            bundle_mut(state, grade_id, subject_id)
                .textbooks
                .insert(medium, record.clone());
            push_activity(
                state,
                format!("Added {medium} textbook for {subject_name} - {grade_display}"),
                now,
            );
            Ok(record)
        })
    }

    pub fn add_paper(
        &self,
        grade_id: &str,
        subject_id: &str,
        paper: PaperInput,
    ) -> Result<PaperRecord, CatalogError> {
        let language = resolve_language(paper.language.as_deref())?;
        let category = paper.category.trim().to_string();
        if category.is_empty() {
            return Err(CatalogError::Validation(
                "paper category must not be empty".to_string(),
            ));
        }
        if paper.kind == PaperKind::Term && !TERM_KEYS.contains(&category.as_str()) {
            tracing::warn!(category = %category, "Non-canonical term key accepted");
        }
        let school = paper
            .school
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SCHOOL)
            .to_string();

        self.commit("add_paper", |state, now| {
            ensure_pair(state, grade_id, subject_id)?;
            let record = PaperRecord {
                id: new_record_id(),
                school: school.clone(),
                file: paper.file.into_record(language, now),
            };
            bundle_mut(state, grade_id, subject_id)
                .papers
                .grouping_mut(paper.kind)
                .entry(category.clone())
                .or_default()
                .push(record.clone());
            let kind = match paper.kind {
                PaperKind::Term => "term",
                PaperKind::Chapter => "chapter",
            };
            push_activity(
                state,
                format!("Added {language} {kind} paper ({category}) from {school}"),
                now,
            );
            Ok(record)
        })
    }

    pub fn add_video(
        &self,
        grade_id: &str,
        subject_id: &str,
        video: VideoInput,
    ) -> Result<VideoRecord, CatalogError> {
        let language = resolve_language(video.language.as_deref())?;
        if video.title.trim().is_empty() || video.url.trim().is_empty() {
            return Err(CatalogError::Validation(
                "video title and url are required".to_string(),
            ));
        }

        self.commit("add_video", |state, now| {
            ensure_pair(state, grade_id, subject_id)?;
            let record = VideoRecord {
                id: new_record_id(),
                title: video.title.trim().to_string(),
                url: video.url.trim().to_string(),
                chapter: video.chapter,
                description: video.description,
                language,
                added_date: now,
            };
            state
                .videos
                .entry(grade_id.to_string())
                .or_default()
                .entry(subject_id.to_string())
                .or_default()
                .push(record.clone());
            push_activity(
                state,
                format!("Added {language} video: {}", record.title),
                now,
            );
            Ok(record)
        })
    }

    /// Adds or replaces the note stored under `note.key`.
    pub fn add_note(
        &self,
        grade_id: &str,
        subject_id: &str,
        note: NoteInput,
    ) -> Result<NoteRecord, CatalogError> {
        let language = resolve_language(note.language.as_deref())?;
        let key = note.key.trim().to_string();
        if key.is_empty() {
            return Err(CatalogError::Validation("note key must not be empty".to_string()));
        }

        self.commit("add_note", |state, now| {
            let (grade_display, subject_name) = ensure_pair(state, grade_id, subject_id)?;
            let record = NoteRecord {
                chapter: note.chapter,
                file: note.file.into_record(language, now),
            };
            bundle_mut(state, grade_id, subject_id)
                .notes
                .insert(key.clone(), record.clone());
            push_activity(
                state,
                format!("Added {language} note ({key}) for {subject_name} - {grade_display}"),
                now,
            );
            Ok(record)
        })
    }

    pub fn log_activity(&self, message: &str) -> Result<ActivityLogEntry, CatalogError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CatalogError::Validation(
                "activity message must not be empty".to_string(),
            ));
        }
        self.commit("log_activity", |state, now| {
            Ok(push_activity(state, message.to_string(), now))
        })
    }

    pub fn export_snapshot(&self) -> Result<String, CatalogError> {
        Ok(snapshot::encode(&self.snapshot())?)
    }

    /// Replaces the whole catalog with a decoded snapshot. On any error the
    /// current state is untouched.
    pub fn import_snapshot(&self, serialized: &str) -> Result<ImportReport, ImportError> {
        let decoded = snapshot::decode(serialized)?;
        Ok(self.replace_with(decoded))
    }

    pub fn import_value(&self, value: &serde_json::Value) -> Result<ImportReport, ImportError> {
        let decoded = snapshot::decode_value(value)?;
        Ok(self.replace_with(decoded))
    }

    fn replace_with(&self, (imported, report): (CatalogState, ImportReport)) -> ImportReport {
        let quarantined = report.quarantined.len();
        let applied = self.commit("import_snapshot", move |state, now| {
            *state = imported;
            push_activity(state, MSG_DATA_IMPORTED.to_string(), now);
            Ok(())
        });
        if let Err(error) = applied {
            // Replacement is infallible; keep the signature honest anyway.
            tracing::error!(error = %error, "Import replacement failed");
        }
        tracing::info!(quarantined, "Snapshot imported");
        report
    }

    /// Records an admin upload in the staging list. It does not appear in the
    /// resource tree until [`CatalogStore::promote_upload`] is called.
    pub fn stage_upload(&self, upload: UploadInput) -> Result<UploadedFile, CatalogError> {
        if upload.name.trim().is_empty() {
            return Err(CatalogError::Validation("upload name must not be empty".to_string()));
        }
        let languages = upload
            .languages
            .iter()
            .map(|code| code.trim().parse::<Language>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        if languages.is_empty() {
            return Err(CatalogError::Validation(
                "an upload needs at least one language".to_string(),
            ));
        }

        self.commit("stage_upload", |state, now| {
            let (grade_display, subject_name) =
                ensure_pair(state, &upload.grade, &upload.subject)?;
            let staged = UploadedFile {
                id: new_record_id(),
                name: upload.name.trim().to_string(),
                size: upload.size,
                mime_type: upload.mime_type,
                grade: upload.grade.clone(),
                subject: upload.subject.clone(),
                resource_type: upload.resource_type,
                languages,
                upload_date: now,
            };
            state.uploads.push(staged.clone());
            push_activity(
                state,
                format!("Staged {} for {subject_name} - {grade_display}", staged.name),
                now,
            );
            Ok(staged)
        })
    }

    pub fn list_uploads(
        &self,
        grade_id: &str,
        resource_type: Option<ResourceType>,
    ) -> Vec<UploadedFile> {
        self.snapshot()
            .uploads
            .iter()
            .filter(|upload| upload.grade == grade_id)
            .filter(|upload| resource_type.map_or(true, |kind| upload.resource_type == kind))
            .cloned()
            .collect()
    }

    /// Writes a staged textbook upload into the bundle, one textbook per
    /// staged language, and drops it from the staging list.
    pub fn promote_upload(&self, upload_id: &str) -> Result<Vec<FileRecord>, CatalogError> {
        self.commit("promote_upload", |state, now| {
            let index = state
                .uploads
                .iter()
                .position(|upload| upload.id == upload_id)
                .ok_or_else(|| CatalogError::NotFound {
                    entity: "upload",
                    key: upload_id.to_string(),
                })?;
            let upload = state.uploads[index].clone();
            if upload.resource_type != ResourceType::Textbooks {
                return Err(CatalogError::Validation(format!(
                    "only textbook uploads can be promoted, got {:?}",
                    upload.resource_type
                )));
            }
            let (grade_display, subject_name) =
                ensure_pair(state, &upload.grade, &upload.subject)?;

            let path = format!("uploads/{}/{}/{}", upload.grade, upload.subject, upload.name);
            let mut promoted = Vec::with_capacity(upload.languages.len());
            let bundle = bundle_mut(state, &upload.grade, &upload.subject);
            for language in &upload.languages {
                let record = FileInput {
                    filename: upload.name.clone(),
                    size: upload.size,
                    path: path.clone(),
                }
                .into_record(*language, now);
                bundle.textbooks.insert(*language, record.clone());
                promoted.push(record);
            }
            state.uploads.remove(index);

            let media: Vec<&str> = upload.languages.iter().map(|l| l.code()).collect();
            push_activity(
                state,
                format!(
                    "Promoted {} to {} textbook for {subject_name} - {grade_display}",
                    upload.name,
                    media.join("/")
                ),
                now,
            );
            Ok(promoted)
        })
    }

    fn cell(&self) -> &RwLock<Arc<CatalogState>> {
        self.state
            .get_or_init(|| RwLock::new(Arc::new(self.load_or_seed())))
    }

    fn read(&self) -> RwLockReadGuard<'_, Arc<CatalogState>> {
        self.cell().read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<CatalogState>> {
        self.cell().write().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_or_seed(&self) -> CatalogState {
        match self.gateway.load() {
            Ok(Some(raw)) => match std::str::from_utf8(&raw)
                .map_err(|e| e.to_string())
                .and_then(|text| snapshot::decode(text).map_err(|e| e.to_string()))
            {
                Ok((state, report)) => {
                    tracing::info!(
                        grades = state.grades.len(),
                        subjects = state.subjects.len(),
                        quarantined = report.quarantined.len(),
                        "Loaded saved catalog"
                    );
                    state
                }
                Err(error) => {
                    tracing::error!(error = %error, "Saved catalog is unreadable, using default seed");
                    seed::default_state()
                }
            },
            Ok(None) => {
                tracing::info!("No saved catalog, seeding defaults");
                let state = seed::default_state();
                self.persist(&state);
                state
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to load catalog, using default seed");
                seed::default_state()
            }
        }
    }

    /// Runs `apply` on a copy of the current state and swaps the copy in only
    /// when it succeeds. The write lock is held through the save so saves
    /// land in mutation order.
    fn commit<T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut CatalogState, DateTime<Utc>) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut guard = self.write();
        let mut next = CatalogState::clone(&guard);
        let output = match apply(&mut next, Utc::now()) {
            Ok(output) => output,
            Err(error) => {
                tracing::warn!(operation, error = %error, "Catalog mutation rejected");
                return Err(error);
            }
        };
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        tracing::info!(operation, "Catalog mutation applied");
        self.persist(&next);
        Ok(output)
    }

    fn persist(&self, state: &CatalogState) {
        let result = snapshot::encode(state)
            .map_err(StoreError::from)
            .and_then(|payload| self.gateway.save(payload.as_bytes()));
        match result {
            Ok(()) => self.last_save_failed.store(false, Ordering::Relaxed),
            Err(error) => {
                self.last_save_failed.store(true, Ordering::Relaxed);
                tracing::warn!(error = %error, "Failed to persist catalog, change kept in memory only");
            }
        }
    }
}

/// Checks that the pair can own a bundle and returns the grade display and
/// subject name for activity messages.
fn ensure_pair(
    state: &CatalogState,
    grade_id: &str,
    subject_id: &str,
) -> Result<(String, String), CatalogError> {
    let grade = state
        .grades
        .get(grade_id)
        .ok_or_else(|| CatalogError::unknown_grade(grade_id))?;
    let subject = state
        .subjects
        .get(subject_id)
        .ok_or_else(|| CatalogError::unknown_subject(subject_id))?;
    if !subject.is_offered_in(grade_id) {
        return Err(CatalogError::InvalidReference {
            entity: "subject",
            key: format!("{subject_id} (not offered in {grade_id})"),
        });
    }
    Ok((grade.display.clone(), subject.name.clone()))
}

fn bundle_mut<'a>(
    state: &'a mut CatalogState,
    grade_id: &str,
    subject_id: &str,
) -> &'a mut crate::catalog::model::ResourceBundle {
    state
        .resources
        .entry(grade_id.to_string())
        .or_default()
        .entry(subject_id.to_string())
        .or_default()
}

/// Prepends an entry and drops the oldest ones beyond the cap.
fn push_activity(state: &mut CatalogState, message: String, now: DateTime<Utc>) -> ActivityLogEntry {
    let entry = ActivityLogEntry {
        id: new_record_id(),
        message,
        timestamp: now,
    };
    let activities = &mut state.settings.activities;
    activities.insert(0, entry.clone());
    activities.truncate(ACTIVITY_LOG_CAP);
    state.settings.last_updated = Some(now);
    entry
}
