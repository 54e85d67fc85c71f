use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::catalog::model::{ResourceType, UploadInput};
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_uploads).post(stage_upload))
        .route("/:id/promote", post(promote_upload))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListUploadsQuery {
    grade: String,
    resource_type: Option<ResourceType>,
}

async fn list_uploads(
    State(state): State<AppState>,
    Query(q): Query<ListUploadsQuery>,
) -> impl IntoResponse {
    ok(state.catalog().list_uploads(&q.grade, q.resource_type))
}

async fn stage_upload(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UploadInput>,
) -> Result<impl IntoResponse, AppError> {
    let staged = state.catalog().stage_upload(req)?;
    Ok(created(staged))
}

async fn promote_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let promoted = state.catalog().promote_upload(&id)?;
    Ok(ok(promoted))
}
