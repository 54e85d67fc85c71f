use serde::Serialize;

use crate::catalog::language::{is_visible, Language, LanguageSelector};
use crate::catalog::model::CatalogState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageBreakdown {
    pub sinhala: usize,
    pub tamil: usize,
    pub english: usize,
}

impl LanguageBreakdown {
    fn bump(&mut self, language: Language) {
        match language {
            Language::Sinhala => self.sinhala += 1,
            Language::Tamil => self.tamil += 1,
            Language::English => self.english += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.sinhala + self.tamil + self.english
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_grades: usize,
    pub total_subjects: usize,
    pub total_resources: usize,
    pub total_videos: usize,
    pub language_breakdown: LanguageBreakdown,
}

pub fn compute_stats(state: &CatalogState) -> Stats {
    compute_stats_with(state, LanguageSelector::All)
}

/// Totals over every bundle, counting only records visible under `selector`.
/// Textbooks count under their medium; videos feed the breakdown too.
pub fn compute_stats_with(state: &CatalogState, selector: LanguageSelector) -> Stats {
    let mut stats = Stats {
        total_grades: state.grades.len(),
        total_subjects: state.subjects.len(),
        ..Stats::default()
    };

    let mut count = |language: Language, is_video: bool| {
        if !is_visible(selector, language) {
            return;
        }
        if is_video {
            stats.total_videos += 1;
        } else {
            stats.total_resources += 1;
        }
        stats.language_breakdown.bump(language);
    };

    for bundle in state.resources.values().flat_map(|by_subject| by_subject.values()) {
        for medium in bundle.textbooks.keys() {
            count(*medium, false);
        }
        for paper in bundle.papers.iter() {
            count(paper.file.language, false);
        }
        for note in bundle.notes.values() {
            count(note.file.language, false);
        }
    }
    for video in state
        .videos
        .values()
        .flat_map(|by_subject| by_subject.values())
        .flatten()
    {
        count(video.language, true);
    }

    stats
}
