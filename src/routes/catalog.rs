use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::catalog::language::{indicator_for, DisplayMeta};
use crate::catalog::model::Grade;
use crate::catalog::page::{
    count_notes, count_papers, count_textbooks, count_videos, subject_resource_count, SubjectPage,
};
use crate::catalog::stats::compute_stats_with;
use crate::catalog::{Language, LanguageSelector};
use crate::extractors::LanguageFilter;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/grades", get(list_grades))
        .route("/grades/:grade_id", get(grade_page))
        .route("/grades/:grade_id/subjects/:subject_id", get(subject_page))
        .route("/stats", get(stats))
        .route("/languages", get(languages))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GradeSummary {
    id: String,
    #[serde(flatten)]
    grade: Grade,
    subject_count: usize,
}

async fn list_grades(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.catalog().snapshot();
    let grades: Vec<GradeSummary> = snapshot
        .grades
        .iter()
        .map(|(id, grade)| GradeSummary {
            id: id.clone(),
            grade: grade.clone(),
            subject_count: snapshot.subjects_for_grade(id).len(),
        })
        .collect();
    ok(grades)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubjectCounts {
    textbooks: usize,
    papers: usize,
    notes: usize,
    videos: usize,
    total: usize,
}

impl SubjectCounts {
    fn of(page: &SubjectPage) -> Self {
        Self {
            textbooks: count_textbooks(&page.resources),
            papers: count_papers(&page.resources),
            notes: count_notes(&page.resources),
            videos: count_videos(&page.videos),
            total: subject_resource_count(page),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubjectView {
    #[serde(flatten)]
    page: SubjectPage,
    counts: SubjectCounts,
    has_content: bool,
}

impl SubjectView {
    fn new(page: SubjectPage) -> Self {
        let counts = SubjectCounts::of(&page);
        let has_content = counts.total + counts.videos > 0;
        Self {
            page,
            counts,
            has_content,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GradePageView {
    grade_id: String,
    grade: Grade,
    language: LanguageSelector,
    subjects: Vec<SubjectView>,
    total_resources: usize,
    total_videos: usize,
}

async fn grade_page(
    State(state): State<AppState>,
    Path(grade_id): Path<String>,
    LanguageFilter(selector): LanguageFilter,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .catalog()
        .grade_page(&grade_id)
        .ok_or_else(|| AppError::not_found(&format!("Grade {grade_id} not found")))?
        .filtered(selector);

    let total_resources = page.total_resources();
    let total_videos = page.total_videos();
    Ok(ok(GradePageView {
        grade_id: page.grade_id,
        grade: page.grade,
        language: selector,
        subjects: page.subjects.into_values().map(SubjectView::new).collect(),
        total_resources,
        total_videos,
    }))
}

async fn subject_page(
    State(state): State<AppState>,
    Path((grade_id, subject_id)): Path<(String, String)>,
    LanguageFilter(selector): LanguageFilter,
) -> Result<impl IntoResponse, AppError> {
    let mut page = state
        .catalog()
        .grade_page(&grade_id)
        .ok_or_else(|| AppError::not_found(&format!("Grade {grade_id} not found")))?;
    let subject = page.subjects.remove(&subject_id).ok_or_else(|| {
        AppError::not_found(&format!("Subject {subject_id} is not offered in {grade_id}"))
    })?;
    Ok(ok(SubjectView::new(subject.filtered(selector))))
}

async fn stats(
    State(state): State<AppState>,
    LanguageFilter(selector): LanguageFilter,
) -> impl IntoResponse {
    ok(compute_stats_with(&state.catalog().snapshot(), selector))
}

async fn languages() -> impl IntoResponse {
    let all: Vec<DisplayMeta> = Language::ALL.into_iter().map(indicator_for).collect();
    ok(all)
}
