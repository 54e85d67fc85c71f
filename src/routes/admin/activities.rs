use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_activities).post(log_activity))
}

/// Newest first, at most the cap.
async fn list_activities(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.catalog().snapshot();
    ok(snapshot.activities().to_vec())
}

#[derive(Debug, Deserialize)]
struct LogActivityRequest {
    message: String,
}

async fn log_activity(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LogActivityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.catalog().log_activity(&req.message)?;
    Ok(created(entry))
}
