use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;

use crate::constants::MSG_DATA_EXPORTED;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export", get(export_snapshot))
        .route("/import", post(import_snapshot))
}

/// Full snapshot as a JSON download. The export is logged after the payload
/// is taken, so the log entry lands in the next export, not this one.
async fn export_snapshot(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let payload = state.catalog().export_snapshot()?;
    state.catalog().log_activity(MSG_DATA_EXPORTED)?;

    let disposition = format!(
        "attachment; filename=\"catalog-backup-{}.json\"",
        Utc::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload,
    ))
}

/// Takes the raw body so a broken payload surfaces as an import error rather
/// than a generic body rejection.
async fn import_snapshot(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let report = state.catalog().import_snapshot(&body)?;
    Ok(ok(report))
}
