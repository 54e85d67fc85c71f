use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::language::Language;
use crate::constants::{DEFAULT_SITE_NAME, TERM_KEYS, UNKNOWN_SCHOOL};

pub type GradeId = String;
pub type SubjectId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub name: String,
    pub display: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Ids for papers, videos, uploads and log entries. Random v4 uuids, so two
/// records created in the same instant never collide.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Accepts an id written either as a string or as a bare number; older
/// exports stamped activity entries with a millisecond timestamp.
fn record_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

fn unknown_school() -> String {
    UNKNOWN_SCHOOL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub grades: BTreeSet<GradeId>,
}

impl Subject {
    pub fn is_offered_in(&self, grade_id: &str) -> bool {
        self.grades.contains(grade_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "Utc::now")]
    pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    #[serde(default = "new_record_id", deserialize_with = "record_id")]
    pub id: String,
    #[serde(default = "unknown_school")]
    pub school: String,
    #[serde(flatten)]
    pub file: FileRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(flatten)]
    pub file: FileRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    #[serde(default = "new_record_id", deserialize_with = "record_id")]
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "Utc::now")]
    pub added_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperKind {
    Term,
    Chapter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Papers {
    pub terms: BTreeMap<String, Vec<PaperRecord>>,
    pub chapters: BTreeMap<String, Vec<PaperRecord>>,
}

impl Default for Papers {
    fn default() -> Self {
        Self {
            terms: TERM_KEYS
                .iter()
                .map(|key| (key.to_string(), Vec::new()))
                .collect(),
            chapters: BTreeMap::new(),
        }
    }
}

impl Papers {
    pub fn grouping(&self, kind: PaperKind) -> &BTreeMap<String, Vec<PaperRecord>> {
        match kind {
            PaperKind::Term => &self.terms,
            PaperKind::Chapter => &self.chapters,
        }
    }

    pub fn grouping_mut(&mut self, kind: PaperKind) -> &mut BTreeMap<String, Vec<PaperRecord>> {
        match kind {
            PaperKind::Term => &mut self.terms,
            PaperKind::Chapter => &mut self.chapters,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaperRecord> {
        self.terms.values().chain(self.chapters.values()).flatten()
    }
}

/// Everything stored for one grade/subject pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBundle {
    #[serde(default)]
    pub textbooks: BTreeMap<Language, FileRecord>,
    #[serde(default)]
    pub papers: Papers,
    #[serde(default)]
    pub notes: BTreeMap<String, NoteRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    #[serde(default = "new_record_id", deserialize_with = "record_id")]
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub site_name: String,
    pub last_updated: Option<DateTime<Utc>>,
    /// Newest first.
    pub activities: Vec<ActivityLogEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            last_updated: None,
            activities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Textbooks,
    Papers,
    Notes,
    Videos,
}

/// Admin-side staged upload. Lives beside the resource tree, not inside it,
/// until promoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub grade: GradeId,
    pub subject: SubjectId,
    pub resource_type: ResourceType,
    pub languages: BTreeSet<Language>,
    pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogState {
    pub grades: BTreeMap<GradeId, Grade>,
    pub subjects: BTreeMap<SubjectId, Subject>,
    pub resources: BTreeMap<GradeId, BTreeMap<SubjectId, ResourceBundle>>,
    pub videos: BTreeMap<GradeId, BTreeMap<SubjectId, Vec<VideoRecord>>>,
    pub settings: Settings,
    pub uploads: Vec<UploadedFile>,
}

impl CatalogState {
    pub fn subjects_for_grade(&self, grade_id: &str) -> BTreeMap<&str, &Subject> {
        self.subjects
            .iter()
            .filter(|(_, subject)| subject.is_offered_in(grade_id))
            .map(|(id, subject)| (id.as_str(), subject))
            .collect()
    }

    /// The stored bundle, or the empty shape when nothing was added yet.
    pub fn resources_for(&self, grade_id: &str, subject_id: &str) -> ResourceBundle {
        self.resources
            .get(grade_id)
            .and_then(|by_subject| by_subject.get(subject_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn videos_for(&self, grade_id: &str, subject_id: &str) -> Vec<VideoRecord> {
        self.videos
            .get(grade_id)
            .and_then(|by_subject| by_subject.get(subject_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn activities(&self) -> &[ActivityLogEntry] {
        &self.settings.activities
    }
}

// Mutation inputs

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub path: String,
}

impl FileInput {
    pub fn into_record(self, language: Language, upload_date: DateTime<Utc>) -> FileRecord {
        FileRecord {
            filename: self.filename,
            size: self.size,
            path: self.path,
            language,
            upload_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperInput {
    pub kind: PaperKind,
    pub category: String,
    #[serde(flatten)]
    pub file: FileInput,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    pub key: String,
    #[serde(flatten)]
    pub file: FileInput,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInput {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadInput {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    pub grade: GradeId,
    pub subject: SubjectId,
    pub resource_type: ResourceType,
    pub languages: Vec<String>,
}
