//! Catalog maintenance endpoints. There is no authentication in front of
//! them; deploy behind something that provides it.

pub mod activities;
pub mod backup;
pub mod resources;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(resources::router())
        .nest("/activities", activities::router())
        .merge(backup::router())
        .nest("/uploads", uploads::router())
}
