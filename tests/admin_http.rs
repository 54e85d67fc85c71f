mod common;

use axum::http::{header, Method, StatusCode};
use serde_json::json;

use common::app::spawn_test_app;
use common::fixtures::{paper_body, textbook_body};
use common::http::{
    assert_json_error, assert_status_ok_json, get_json, post_json, request, request_raw,
    response_json,
};

#[tokio::test]
async fn it_textbook_readd_replaces_same_medium() {
    let app = spawn_test_app().await;

    for name in ["v1.pdf", "v2.pdf"] {
        let (status, body) = post_json(
            &app.app,
            "/api/admin/textbooks",
            textbook_body("grade8", "science", "tamil", name),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["language"], "tamil");
    }

    let (_, body) = get_json(&app.app, "/api/catalog/grades/grade8/subjects/science").await;
    let textbooks = body["data"]["resources"]["textbooks"].as_object().unwrap();
    assert_eq!(textbooks.len(), 1);
    assert_eq!(textbooks["tamil"]["filename"], "v2.pdf");
}

#[tokio::test]
async fn it_rejects_unknown_references_and_languages() {
    let app = spawn_test_app().await;

    let (status, body) = post_json(
        &app.app,
        "/api/admin/textbooks",
        textbook_body("grade5", "science", "english", "x.pdf"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_REFERENCE");

    let (status, body) = post_json(
        &app.app,
        "/api/admin/papers",
        paper_body("grade9", "science", "term", "term1", "german"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_LANGUAGE");
    assert!(body["traceId"].is_string());

    let (_, activities) = get_json(&app.app, "/api/admin/activities").await;
    assert!(activities["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn it_papers_append_with_defaults() {
    let app = spawn_test_app().await;

    for _ in 0..2 {
        let (status, body) = post_json(
            &app.app,
            "/api/admin/papers",
            json!({
                "grade": "grade9",
                "subject": "mathematics",
                "kind": "term",
                "category": "term2",
                "filename": "t2.pdf",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["school"], "Unknown School");
        assert_eq!(body["data"]["language"], "english");
    }

    let (_, body) = get_json(&app.app, "/api/catalog/grades/grade9/subjects/mathematics").await;
    let term2 = body["data"]["resources"]["papers"]["terms"]["term2"]
        .as_array()
        .unwrap();
    assert_eq!(term2.len(), 2);
    assert_ne!(term2[0]["id"], term2[1]["id"]);
}

#[tokio::test]
async fn it_adds_videos_and_notes() {
    let app = spawn_test_app().await;

    let (status, body) = post_json(
        &app.app,
        "/api/admin/videos",
        json!({
            "grade": "al",
            "subject": "chemistry",
            "title": "Moles",
            "url": "https://example.com/moles",
            "language": "sinhala",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["language"], "sinhala");

    let (status, _) = post_json(
        &app.app,
        "/api/admin/notes",
        json!({
            "grade": "al",
            "subject": "chemistry",
            "key": "ch2",
            "chapter": "ch2",
            "filename": "notes.pdf",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, page) = get_json(&app.app, "/api/catalog/grades/al").await;
    assert_eq!(page["data"]["totalVideos"], 1);
    assert_eq!(page["data"]["totalResources"], 1);

    let (_, activities) = get_json(&app.app, "/api/admin/activities").await;
    let log = activities["data"].as_array().unwrap();
    assert_eq!(log.len(), 2);
    assert!(log[0]["message"].as_str().unwrap().starts_with("Added english note (ch2)"));
    assert_eq!(log[1]["message"], "Added sinhala video: Moles");
}

#[tokio::test]
async fn it_malformed_body_is_json_error() {
    let app = spawn_test_app().await;

    let (status, body) =
        post_json(&app.app, "/api/admin/videos", json!({"grade": "grade6"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_REQUEST_BODY");
}

#[tokio::test]
async fn it_activity_log_caps_at_fifty() {
    let app = spawn_test_app().await;

    for i in 0..55 {
        let (status, _) =
            post_json(&app.app, "/api/admin/activities", json!({"message": format!("e{i}")})).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = get_json(&app.app, "/api/admin/activities").await;
    let log = body["data"].as_array().unwrap();
    assert_eq!(log.len(), 50);
    assert_eq!(log[0]["message"], "e54");
    assert_eq!(log[49]["message"], "e5");
}

#[tokio::test]
async fn it_export_then_import_round_trips() {
    let app = spawn_test_app().await;
    post_json(
        &app.app,
        "/api/admin/textbooks",
        textbook_body("grade7", "sinhala", "sinhala", "sinhala7.pdf"),
    )
    .await;

    let resp = request(&app.app, Method::GET, "/api/admin/export", None, &[]).await;
    assert!(resp.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment"));
    let (status, _, exported) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exported["schemaVersion"], 1);
    assert!(exported["resources"]["grade7"]["sinhala"]["textbooks"]["sinhala"].is_object());

    let (_, activities) = get_json(&app.app, "/api/admin/activities").await;
    assert_eq!(activities["data"][0]["message"], "Data exported successfully");

    let (_, before) = get_json(&app.app, "/api/catalog/stats").await;
    let (status, body) = post_json(&app.app, "/api/admin/import", exported).await;
    assert_status_ok_json(status, &body);
    assert!(body["data"]["quarantined"].as_array().unwrap().is_empty());

    let (_, after) = get_json(&app.app, "/api/catalog/stats").await;
    assert_eq!(before["data"], after["data"]);

    let (_, activities) = get_json(&app.app, "/api/admin/activities").await;
    assert_eq!(activities["data"][0]["message"], "Data imported successfully");
}

#[tokio::test]
async fn it_import_rejects_bad_payloads_without_change() {
    let app = spawn_test_app().await;
    post_json(
        &app.app,
        "/api/admin/textbooks",
        textbook_body("grade6", "english", "english", "eng.pdf"),
    )
    .await;

    let resp = request_raw(&app.app, Method::POST, "/api/admin/import", "{not json").await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "IMPORT_INVALID_JSON");

    let (status, body) =
        post_json(&app.app, "/api/admin/import", json!({"subjects": {}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "IMPORT_MALFORMED");

    let (status, body) = post_json(
        &app.app,
        "/api/admin/import",
        json!({"schemaVersion": 99, "grades": {}, "subjects": {}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "IMPORT_UNSUPPORTED_VERSION");

    let (_, stats) = get_json(&app.app, "/api/catalog/stats").await;
    assert_eq!(stats["data"]["totalResources"], 1);
    assert_eq!(stats["data"]["totalGrades"], 7);
}

#[tokio::test]
async fn it_import_quarantines_bad_records() {
    let app = spawn_test_app().await;

    let payload = json!({
        "grades": {"grade6": {"name": "Grade 6", "display": "Grade 6"}},
        "subjects": {"science": {"name": "Science", "grades": ["grade6"]}},
        "resources": {
            "grade6": {
                "science": {
                    "textbooks": {
                        "english": {"filename": "sci.pdf"},
                        "french": {"filename": "sci-fr.pdf"}
                    }
                }
            }
        }
    });
    let (status, body) = post_json(&app.app, "/api/admin/import", payload).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["schemaVersion"], 0);
    let quarantined = body["data"]["quarantined"].as_array().unwrap();
    assert_eq!(quarantined.len(), 1);
    assert_eq!(
        quarantined[0]["path"],
        "resources.grade6.science.textbooks.french"
    );

    let (_, stats) = get_json(&app.app, "/api/catalog/stats").await;
    assert_eq!(stats["data"]["totalGrades"], 1);
    assert_eq!(stats["data"]["totalResources"], 1);
}

#[tokio::test]
async fn it_upload_staging_and_promotion() {
    let app = spawn_test_app().await;

    let (status, body) = post_json(
        &app.app,
        "/api/admin/uploads",
        json!({
            "name": "maths-g10.pdf",
            "size": 9000,
            "type": "application/pdf",
            "grade": "grade10",
            "subject": "mathematics",
            "resourceType": "textbooks",
            "languages": ["tamil", "english"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, listed) =
        get_json(&app.app, "/api/admin/uploads?grade=grade10&resourceType=textbooks").await;
    assert_status_ok_json(status, &listed);
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let (_, page) = get_json(&app.app, "/api/catalog/grades/grade10").await;
    assert_eq!(page["data"]["totalResources"], 0);

    let (status, promoted) =
        post_json(&app.app, &format!("/api/admin/uploads/{id}/promote"), json!({})).await;
    assert_status_ok_json(status, &promoted);
    assert_eq!(promoted["data"].as_array().unwrap().len(), 2);

    let (_, page) = get_json(&app.app, "/api/catalog/grades/grade10/subjects/mathematics").await;
    assert_eq!(page["data"]["counts"]["textbooks"], 2);

    let (status, body) =
        post_json(&app.app, &format!("/api/admin/uploads/{id}/promote"), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");
}

#[tokio::test]
async fn it_upload_with_unknown_language_is_rejected() {
    let app = spawn_test_app().await;

    let (status, body) = post_json(
        &app.app,
        "/api/admin/uploads",
        json!({
            "name": "x.pdf",
            "grade": "grade6",
            "subject": "science",
            "resourceType": "papers",
            "languages": ["klingon"],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_LANGUAGE");
}
