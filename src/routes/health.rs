use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/store", get(store_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.catalog().persistence_healthy();
    Json(serde_json::json!({
        "status": if healthy { "ok" } else { "degraded" },
        "uptimeSecs": state.uptime_secs(),
        "store": {
            "healthy": healthy,
            "ephemeral": state.config().ephemeral_store,
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Ready once the catalog has been loaded or seeded.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.catalog().is_initialized() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub async fn store_health(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog();
    let snapshot = catalog.snapshot();
    Json(serde_json::json!({
        "healthy": catalog.persistence_healthy(),
        "lastUpdated": snapshot.settings.last_updated,
        "grades": snapshot.grades.len(),
        "subjects": snapshot.subjects.len(),
        "records": crate::catalog::snapshot::record_counts(&snapshot),
    }))
}
