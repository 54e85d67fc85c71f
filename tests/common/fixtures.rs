use serde_json::{json, Value};

use resource_catalog::catalog::model::FileInput;
use resource_catalog::catalog::PaperInput;
use resource_catalog::catalog::model::PaperKind;

pub fn file_input(name: &str) -> FileInput {
    FileInput {
        filename: name.to_string(),
        size: 2048,
        path: format!("files/{name}"),
    }
}

pub fn chapter_paper(category: &str, language: &str) -> PaperInput {
    PaperInput {
        kind: PaperKind::Chapter,
        category: category.to_string(),
        file: file_input(&format!("{category}-{language}.pdf")),
        school: Some("Royal College".to_string()),
        language: Some(language.to_string()),
    }
}

pub fn textbook_body(grade: &str, subject: &str, medium: &str, filename: &str) -> Value {
    json!({
        "grade": grade,
        "subject": subject,
        "medium": medium,
        "filename": filename,
        "size": 1024,
        "path": format!("textbooks/{filename}"),
    })
}

pub fn paper_body(grade: &str, subject: &str, kind: &str, category: &str, language: &str) -> Value {
    json!({
        "grade": grade,
        "subject": subject,
        "kind": kind,
        "category": category,
        "language": language,
        "filename": format!("{category}-{language}.pdf"),
        "size": 512,
    })
}
