//! Route definitions for the `/audit-logs` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Routes mounted at `/audit-logs` (HR only).
///
/// ```text
/// GET    /         -> list_audit_logs
/// GET    /verify   -> verify_audit_chain
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(audit::list_audit_logs))
        .route("/verify", get(audit::verify_audit_chain))
}
