//! Route definitions for the `/employees` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::employee;
use crate::state::AppState;

/// Routes mounted at `/employees`.
///
/// ```text
/// GET    /                         -> list_employees
/// GET    /i9-deadlines             -> list_i9_deadlines
/// GET    /{id}                     -> get_employee
/// POST   /{id}/i9-section2         -> complete_i9_section2
/// POST   /{id}/onboarding-token    -> reissue_onboarding_token
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(employee::list_employees))
        .route("/i9-deadlines", get(employee::list_i9_deadlines))
        .route("/{id}", get(employee::get_employee))
        .route("/{id}/i9-section2", post(employee::complete_i9_section2))
        .route(
            "/{id}/onboarding-token",
            post(employee::reissue_onboarding_token),
        )
}
