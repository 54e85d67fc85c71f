use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::language::{is_visible, LanguageSelector};
use crate::catalog::model::{CatalogState, Grade, ResourceBundle, ResourceType, VideoRecord};

/// One subject as shown on a grade page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPage {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub resources: ResourceBundle,
    pub videos: Vec<VideoRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePageData {
    pub grade_id: String,
    pub grade: Grade,
    pub subjects: BTreeMap<String, SubjectPage>,
}

/// Assembles the page for `grade_id`, or `None` when the grade is unknown.
/// Subjects without stored data get the empty bundle, never a hole.
pub fn build_grade_page(state: &CatalogState, grade_id: &str) -> Option<GradePageData> {
    let grade = state.grades.get(grade_id)?;
    let subjects = state
        .subjects_for_grade(grade_id)
        .into_iter()
        .map(|(id, subject)| {
            let page = SubjectPage {
                id: id.to_string(),
                name: subject.name.clone(),
                icon: subject.icon.clone(),
                resources: state.resources_for(grade_id, id),
                videos: state.videos_for(grade_id, id),
            };
            (id.to_string(), page)
        })
        .collect();

    Some(GradePageData {
        grade_id: grade_id.to_string(),
        grade: grade.clone(),
        subjects,
    })
}

pub fn count_textbooks(bundle: &ResourceBundle) -> usize {
    bundle.textbooks.len()
}

pub fn count_papers(bundle: &ResourceBundle) -> usize {
    bundle.papers.iter().count()
}

pub fn count_notes(bundle: &ResourceBundle) -> usize {
    bundle.notes.len()
}

pub fn count_videos(videos: &[VideoRecord]) -> usize {
    videos.len()
}

/// Textbooks, papers and notes of one subject. Videos are counted apart.
pub fn subject_resource_count(page: &SubjectPage) -> usize {
    count_textbooks(&page.resources) + count_papers(&page.resources) + count_notes(&page.resources)
}

impl SubjectPage {
    /// Whether any record of `kind` survives the selector.
    pub fn has_visible(&self, kind: ResourceType, selector: LanguageSelector) -> bool {
        let bundle = &self.resources;
        match kind {
            ResourceType::Textbooks => bundle
                .textbooks
                .keys()
                .any(|medium| is_visible(selector, *medium)),
            ResourceType::Papers => bundle
                .papers
                .iter()
                .any(|paper| is_visible(selector, paper.file.language)),
            ResourceType::Notes => bundle
                .notes
                .values()
                .any(|note| is_visible(selector, note.file.language)),
            ResourceType::Videos => self
                .videos
                .iter()
                .any(|video| is_visible(selector, video.language)),
        }
    }

    pub fn filtered(&self, selector: LanguageSelector) -> SubjectPage {
        let mut page = self.clone();
        let bundle = &mut page.resources;
        bundle
            .textbooks
            .retain(|medium, _| is_visible(selector, *medium));
        for grouping in [&mut bundle.papers.terms, &mut bundle.papers.chapters] {
            for papers in grouping.values_mut() {
                papers.retain(|paper| is_visible(selector, paper.file.language));
            }
        }
        bundle
            .notes
            .retain(|_, note| is_visible(selector, note.file.language));
        page.videos
            .retain(|video| is_visible(selector, video.language));
        page
    }
}

impl GradePageData {
    /// Same page with only the records visible under `selector`. Subjects and
    /// paper keys are kept even when emptied, so the layout stays stable.
    pub fn filtered(&self, selector: LanguageSelector) -> GradePageData {
        if selector == LanguageSelector::All {
            return self.clone();
        }
        GradePageData {
            grade_id: self.grade_id.clone(),
            grade: self.grade.clone(),
            subjects: self
                .subjects
                .iter()
                .map(|(id, page)| (id.clone(), page.filtered(selector)))
                .collect(),
        }
    }

    pub fn total_resources(&self) -> usize {
        self.subjects.values().map(subject_resource_count).sum()
    }

    pub fn total_videos(&self) -> usize {
        self.subjects.values().map(|page| count_videos(&page.videos)).sum()
    }
}
