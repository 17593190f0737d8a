//! Route definitions for the `/onboarding` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{invitation, onboarding};
use crate::state::AppState;

/// Routes mounted at `/onboarding`.
///
/// Session routes take the onboarding token as a Bearer credential;
/// invitation routes take a staff token.
///
/// ```text
/// GET    /welcome/{token}          -> welcome
/// GET    /session                  -> get_session
/// PUT    /session/steps/{step}     -> save_step
/// POST   /session/lock             -> acquire_lock
/// DELETE /session/lock             -> release_lock
/// POST   /session/complete         -> complete
/// GET    /invitations              -> list_invitations (staff)
/// POST   /invitations              -> create_invitation (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/welcome/{token}", get(onboarding::welcome))
        .route("/session", get(onboarding::get_session))
        .route("/session/steps/{step}", put(onboarding::save_step))
        .route(
            "/session/lock",
            post(onboarding::acquire_lock).delete(onboarding::release_lock),
        )
        .route("/session/complete", post(onboarding::complete))
        .route(
            "/invitations",
            get(invitation::list_invitations).post(invitation::create_invitation),
        )
}
