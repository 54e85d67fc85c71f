//! Snapshot codec: full-state export and validated import.
//!
//! Export is a pretty-printed JSON object `{schemaVersion, grades, subjects,
//! resources, videos, settings, uploads}`; all maps are ordered so the same
//! state always produces the same bytes.
//!
//! Import only insists on `grades` and `subjects` being present. Everything
//! below them is walked entry by entry: entries that fail to decode, carry a
//! language outside the three media, point at an unknown grade/subject pair,
//! repeat an id already seen in the same sequence, or miss a field the
//! mutations would insist on are quarantined (left out and listed in the
//! [`ImportReport`]), and a non-sequence where a sequence belongs is read as
//! empty.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::error::ImportError;
use crate::catalog::language::Language;
use crate::catalog::model::{
    ActivityLogEntry, CatalogState, FileRecord, Grade, NoteRecord, PaperKind, PaperRecord,
    Papers, ResourceBundle, Settings, Subject, UploadedFile, VideoRecord,
};
use crate::constants::{ACTIVITY_LOG_CAP, SNAPSHOT_SCHEMA_VERSION};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    schema_version: u32,
    #[serde(flatten)]
    state: &'a CatalogState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantinedEntry {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub schema_version: u64,
    pub quarantined: Vec<QuarantinedEntry>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.quarantined.is_empty()
    }
}

pub fn encode(state: &CatalogState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&SnapshotRef {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        state,
    })
}

pub fn decode(payload: &str) -> Result<(CatalogState, ImportReport), ImportError> {
    let value: Value = serde_json::from_str(payload)?;
    decode_value(&value)
}

pub fn decode_value(value: &Value) -> Result<(CatalogState, ImportReport), ImportError> {
    let Some(root) = value.as_object() else {
        return Err(ImportError::MalformedFormat(
            "snapshot must be a JSON object".to_string(),
        ));
    };

    let schema_version = match root.get("schemaVersion") {
        None | Some(Value::Null) => 0,
        Some(raw) => raw.as_u64().ok_or_else(|| {
            ImportError::MalformedFormat("schemaVersion must be a non-negative integer".to_string())
        })?,
    };
    if schema_version > u64::from(SNAPSHOT_SCHEMA_VERSION) {
        return Err(ImportError::UnsupportedVersion {
            found: schema_version,
            supported: SNAPSHOT_SCHEMA_VERSION,
        });
    }

    let grades = required_object(root, "grades")?;
    let subjects = required_object(root, "subjects")?;

    let mut decoder = Decoder {
        report: ImportReport {
            schema_version,
            quarantined: Vec::new(),
        },
    };

    let mut state = CatalogState::default();
    for (id, raw) in grades {
        if let Some(grade) = decoder.entry::<Grade>(format!("grades.{id}"), raw) {
            state.grades.insert(id.clone(), grade);
        }
    }
    for (id, raw) in subjects {
        if let Some(subject) = decoder.entry::<Subject>(format!("subjects.{id}"), raw) {
            state.subjects.insert(id.clone(), subject);
        }
    }

    if let Some(resources) = decoder.optional_object(root, "resources") {
        for (grade_id, by_subject) in resources {
            let path = format!("resources.{grade_id}");
            let Some(by_subject) = decoder.object(&path, by_subject) else {
                continue;
            };
            for (subject_id, raw) in by_subject {
                let path = format!("{path}.{subject_id}");
                if !decoder.pair_is_valid(&state, &path, grade_id, subject_id) {
                    continue;
                }
                if let Some(bundle) = decoder.bundle(&path, raw) {
                    state
                        .resources
                        .entry(grade_id.clone())
                        .or_default()
                        .insert(subject_id.clone(), bundle);
                }
            }
        }
    }

    if let Some(videos) = decoder.optional_object(root, "videos") {
        for (grade_id, by_subject) in videos {
            let path = format!("videos.{grade_id}");
            let Some(by_subject) = decoder.object(&path, by_subject) else {
                continue;
            };
            for (subject_id, raw) in by_subject {
                let path = format!("{path}.{subject_id}");
                if !decoder.pair_is_valid(&state, &path, grade_id, subject_id) {
                    continue;
                }
                let list: Vec<VideoRecord> = decoder.records(&path, raw);
                state
                    .videos
                    .entry(grade_id.clone())
                    .or_default()
                    .insert(subject_id.clone(), list);
            }
        }
    }

    if let Some(settings) = decoder.optional_object(root, "settings") {
        state.settings = decoder.settings(settings);
    }

    if let Some(raw) = root.get("uploads") {
        for (index, upload) in decoder.indexed_records::<UploadedFile>("uploads", raw) {
            let path = format!("uploads[{index}]");
            if decoder.pair_is_valid(&state, &path, &upload.grade, &upload.subject) {
                state.uploads.push(upload);
            }
        }
    }

    Ok((state, decoder.report))
}

fn required_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Map<String, Value>, ImportError> {
    match root.get(key) {
        None | Some(Value::Null) => Err(ImportError::MalformedFormat(format!(
            "missing required field `{key}`"
        ))),
        Some(value) => value
            .as_object()
            .ok_or_else(|| ImportError::MalformedFormat(format!("`{key}` must be an object"))),
    }
}

/// Records that live in id-keyed sequences and get the same checks on import
/// as when they are added one at a time.
trait SequenceRecord: DeserializeOwned {
    fn record_id(&self) -> &str;

    fn problem(&self) -> Option<&'static str> {
        None
    }
}

impl SequenceRecord for PaperRecord {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl SequenceRecord for VideoRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn problem(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() || self.url.trim().is_empty() {
            Some("video title and url must not be empty")
        } else {
            None
        }
    }
}

impl SequenceRecord for UploadedFile {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn problem(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("upload name must not be empty")
        } else if self.languages.is_empty() {
            Some("upload must name at least one language")
        } else {
            None
        }
    }
}

struct Decoder {
    report: ImportReport,
}

impl Decoder {
    fn quarantine(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        let entry = QuarantinedEntry {
            path: path.into(),
            reason: reason.into(),
        };
        tracing::warn!(path = %entry.path, reason = %entry.reason, "Quarantined snapshot entry");
        self.report.quarantined.push(entry);
    }

    fn entry<T: DeserializeOwned>(&mut self, path: String, raw: &Value) -> Option<T> {
        match T::deserialize(raw) {
            Ok(value) => Some(value),
            Err(error) => {
                self.quarantine(path, error.to_string());
                None
            }
        }
    }

    fn object<'a>(&mut self, path: &str, raw: &'a Value) -> Option<&'a Map<String, Value>> {
        match raw {
            Value::Object(map) => Some(map),
            Value::Null => None,
            _ => {
                self.quarantine(path, "expected an object");
                None
            }
        }
    }

    fn optional_object<'a>(
        &mut self,
        root: &'a Map<String, Value>,
        key: &str,
    ) -> Option<&'a Map<String, Value>> {
        root.get(key).and_then(|raw| self.object(key, raw))
    }

    /// Decodes every element of a JSON array; anything else reads as empty.
    fn sequence<T: DeserializeOwned>(&mut self, path: &str, raw: &Value) -> Vec<T> {
        match raw {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| self.entry(format!("{path}[{index}]"), item))
                .collect(),
            Value::Null => Vec::new(),
            _ => {
                self.quarantine(path, "expected a sequence, treated as empty");
                Vec::new()
            }
        }
    }

    /// Like [`Decoder::sequence`], but keeps the source index of each survivor
    /// and quarantines records that fail their own checks or reuse an id.
    fn indexed_records<T: SequenceRecord>(&mut self, path: &str, raw: &Value) -> Vec<(usize, T)> {
        let Value::Array(items) = raw else {
            // Non-sequences are reported (or skipped for null) the usual way.
            let _: Vec<T> = self.sequence(path, raw);
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{path}[{index}]");
            let Some(record) = self.entry::<T>(item_path.clone(), item) else {
                continue;
            };
            if let Some(problem) = record.problem() {
                self.quarantine(item_path, problem);
                continue;
            }
            if !seen.insert(record.record_id().to_string()) {
                let reason = format!("duplicate id `{}`", record.record_id());
                self.quarantine(item_path, reason);
                continue;
            }
            kept.push((index, record));
        }
        kept
    }

    fn records<T: SequenceRecord>(&mut self, path: &str, raw: &Value) -> Vec<T> {
        self.indexed_records(path, raw)
            .into_iter()
            .map(|(_, record)| record)
            .collect()
    }

    fn pair_is_valid(
        &mut self,
        state: &CatalogState,
        path: &str,
        grade_id: &str,
        subject_id: &str,
    ) -> bool {
        if !state.grades.contains_key(grade_id) {
            self.quarantine(path, format!("unknown grade `{grade_id}`"));
            return false;
        }
        match state.subjects.get(subject_id) {
            None => {
                self.quarantine(path, format!("unknown subject `{subject_id}`"));
                false
            }
            Some(subject) if !subject.is_offered_in(grade_id) => {
                self.quarantine(
                    path,
                    format!("subject `{subject_id}` is not offered in `{grade_id}`"),
                );
                false
            }
            Some(_) => true,
        }
    }

    fn bundle(&mut self, path: &str, raw: &Value) -> Option<ResourceBundle> {
        let map = self.object(path, raw)?;
        let mut bundle = ResourceBundle::default();

        if let Some(textbooks) = map.get("textbooks") {
            let textbooks_path = format!("{path}.textbooks");
            if let Some(textbooks) = self.object(&textbooks_path, textbooks) {
                for (medium, raw) in textbooks {
                    let entry_path = format!("{textbooks_path}.{medium}");
                    let language = match medium.parse::<Language>() {
                        Ok(language) => language,
                        Err(error) => {
                            self.quarantine(entry_path, error.to_string());
                            continue;
                        }
                    };
                    if let Some(mut record) = self.entry::<FileRecord>(entry_path, raw) {
                        // The medium key is authoritative for a textbook.
                        record.language = language;
                        bundle.textbooks.insert(language, record);
                    }
                }
            }
        }

        if let Some(papers) = map.get("papers") {
            let papers_path = format!("{path}.papers");
            if let Some(papers) = self.object(&papers_path, papers) {
                bundle.papers = self.papers(&papers_path, papers);
            }
        }

        if let Some(notes) = map.get("notes") {
            let notes_path = format!("{path}.notes");
            if let Some(notes) = self.object(&notes_path, notes) {
                for (key, raw) in notes {
                    if let Some(note) = self.entry::<NoteRecord>(format!("{notes_path}.{key}"), raw)
                    {
                        bundle.notes.insert(key.clone(), note);
                    }
                }
            }
        }

        Some(bundle)
    }

    fn papers(&mut self, path: &str, map: &Map<String, Value>) -> Papers {
        let mut papers = Papers::default();
        for (kind, field) in [(PaperKind::Term, "terms"), (PaperKind::Chapter, "chapters")] {
            let Some(raw) = map.get(field) else {
                continue;
            };
            let group_path = format!("{path}.{field}");
            let Some(groups) = self.object(&group_path, raw) else {
                continue;
            };
            for (key, raw) in groups {
                let list: Vec<PaperRecord> = self.records(&format!("{group_path}.{key}"), raw);
                papers.grouping_mut(kind).insert(key.clone(), list);
            }
        }
        papers
    }

    fn settings(&mut self, map: &Map<String, Value>) -> Settings {
        let mut settings = Settings::default();
        match map.get("siteName") {
            Some(Value::String(name)) => settings.site_name = name.clone(),
            Some(Value::Null) | None => {}
            Some(_) => self.quarantine("settings.siteName", "expected a string"),
        }
        if let Some(raw) = map.get("lastUpdated") {
            settings.last_updated =
                self.entry::<Option<DateTime<Utc>>>("settings.lastUpdated".to_string(), raw)
                    .flatten();
        }
        if let Some(raw) = map.get("activities") {
            let mut activities: Vec<ActivityLogEntry> =
                self.sequence("settings.activities", raw);
            if activities.len() > ACTIVITY_LOG_CAP {
                activities.truncate(ACTIVITY_LOG_CAP);
            }
            settings.activities = activities;
        }
        settings
    }
}

/// Per-kind record counts, used to compare a state with its re-imported copy.
pub fn record_counts(state: &CatalogState) -> BTreeMap<&'static str, usize> {
    let bundles = state.resources.values().flat_map(|by_subject| by_subject.values());
    let mut counts = BTreeMap::from([("textbooks", 0), ("papers", 0), ("notes", 0), ("videos", 0)]);
    for bundle in bundles {
        *counts.entry("textbooks").or_default() += bundle.textbooks.len();
        *counts.entry("papers").or_default() += bundle.papers.iter().count();
        *counts.entry("notes").or_default() += bundle.notes.len();
    }
    *counts.entry("videos").or_default() += state
        .videos
        .values()
        .flat_map(|by_subject| by_subject.values())
        .map(Vec::len)
        .sum::<usize>();
    counts
}
