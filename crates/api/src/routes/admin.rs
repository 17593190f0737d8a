//! Route definitions for the `/admin` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `hr` role (enforced by handler extractors).
///
/// ```text
/// GET    /users        -> list_users
/// POST   /users        -> create_user
/// PUT    /users/{id}   -> update_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}", put(admin::update_user))
}
