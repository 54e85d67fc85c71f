use std::sync::Arc;

use resource_catalog::catalog::language::is_visible_code;
use resource_catalog::catalog::model::{FileInput, PaperKind};
use resource_catalog::catalog::stats::{compute_stats, compute_stats_with};
use resource_catalog::catalog::{
    CatalogError, CatalogStore, Language, LanguageSelector, PaperInput,
};
use resource_catalog::store::MemoryGateway;

fn store() -> CatalogStore {
    let store = CatalogStore::new(Arc::new(MemoryGateway::new()));
    store.initialize();
    store
}

fn file(name: &str) -> FileInput {
    FileInput {
        filename: name.to_string(),
        size: 10,
        path: String::new(),
    }
}

#[test]
fn english_and_sinhala_textbooks_show_in_breakdown() {
    let store = store();
    store
        .add_textbook("grade6", "mathematics", "english", file("en.pdf"))
        .unwrap();
    store
        .add_textbook("grade6", "mathematics", "sinhala", file("si.pdf"))
        .unwrap();

    let stats = compute_stats_with(&store.snapshot(), "all".parse().unwrap());
    assert_eq!(stats.language_breakdown.english, 1);
    assert_eq!(stats.language_breakdown.sinhala, 1);
    assert_eq!(stats.language_breakdown.tamil, 0);
    assert_eq!(stats.total_resources, 2);
}

#[test]
fn tamil_filter_returns_one_chapter_paper() {
    let store = store();
    for language in ["sinhala", "tamil", "english"] {
        store
            .add_paper(
                "grade10",
                "science",
                PaperInput {
                    kind: PaperKind::Chapter,
                    category: "ch1".to_string(),
                    file: file(&format!("{language}.pdf")),
                    school: None,
                    language: Some(language.to_string()),
                },
            )
            .unwrap();
    }

    let page = store
        .grade_page("grade10")
        .unwrap()
        .filtered(LanguageSelector::Only(Language::Tamil));
    let ch1 = &page.subjects["science"].resources.papers.chapters["ch1"];
    assert_eq!(ch1.len(), 1);
    assert_eq!(ch1[0].file.language, Language::Tamil);
}

#[test]
fn unknown_grade_page_is_absent() {
    let store = store();
    assert!(store.grade_page("grade12").is_none());
    assert!(store.grade_page("").is_none());
}

#[test]
fn empty_catalog_stats() {
    let stats = compute_stats(&store().snapshot());
    assert_eq!(stats.total_grades, 7);
    assert_eq!(stats.total_subjects, 10);
    assert_eq!(stats.total_resources, 0);
    assert_eq!(stats.total_videos, 0);
    assert_eq!(stats.language_breakdown.total(), 0);
}

#[test]
fn visibility_rejects_unknown_codes() {
    assert!(is_visible_code("all", "tamil").unwrap());
    assert!(!is_visible_code("english", "tamil").unwrap());
    assert!(matches!(
        is_visible_code("all", "hindi"),
        Err(CatalogError::InvalidLanguage(code)) if code == "hindi"
    ));
    assert!(matches!(
        is_visible_code("everything", "tamil"),
        Err(CatalogError::InvalidLanguage(_))
    ));
}
