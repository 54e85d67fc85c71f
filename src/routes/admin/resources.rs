use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;

use crate::catalog::model::{FileInput, VideoInput};
use crate::catalog::{NoteInput, PaperInput};
use crate::extractors::JsonBody;
use crate::response::{created, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/textbooks", post(add_textbook))
        .route("/papers", post(add_paper))
        .route("/videos", post(add_video))
        .route("/notes", post(add_note))
}

/// Every add request names its grade/subject pair next to the record fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Targeted<T> {
    grade: String,
    subject: String,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextbookBody {
    medium: String,
    #[serde(flatten)]
    file: FileInput,
}

async fn add_textbook(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<Targeted<TextbookBody>>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.catalog().add_textbook(
        &req.grade,
        &req.subject,
        &req.body.medium,
        req.body.file,
    )?;
    Ok(created(record))
}

async fn add_paper(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<Targeted<PaperInput>>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .catalog()
        .add_paper(&req.grade, &req.subject, req.body)?;
    Ok(created(record))
}

async fn add_video(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<Targeted<VideoInput>>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .catalog()
        .add_video(&req.grade, &req.subject, req.body)?;
    Ok(created(record))
}

async fn add_note(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<Targeted<NoteInput>>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .catalog()
        .add_note(&req.grade, &req.subject, req.body)?;
    Ok(created(record))
}
