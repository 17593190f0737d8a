//! Route definitions for job applications.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::application;
use crate::state::AppState;

/// Routes mounted at `/applications`.
///
/// ```text
/// GET    /               -> list_applications
/// GET    /{id}           -> get_application
/// POST   /{id}/approve   -> approve_application
/// POST   /{id}/reject    -> reject_application
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(application::list_applications))
        .route("/{id}", get(application::get_application))
        .route("/{id}/approve", post(application::approve_application))
        .route("/{id}/reject", post(application::reject_application))
}

/// Routes mounted at `/apply` (no authentication).
///
/// ```text
/// POST   /{property_id}  -> submit_application
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new().route("/{property_id}", post(application::submit_application))
}
