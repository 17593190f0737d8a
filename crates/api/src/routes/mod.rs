pub mod admin;
pub mod applications;
pub mod audit;
pub mod auth;
pub mod employees;
pub mod health;
pub mod onboarding;
pub mod properties;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                login (public)
/// /auth/refresh                              refresh (public)
/// /auth/logout                               logout (requires auth)
///
/// /admin/users                               list, create (HR only)
/// /admin/users/{id}                          update (HR only)
///
/// /properties                                list, create (HR only)
/// /properties/{id}                           get, update
/// /properties/{id}/info                      public property card
///
/// /apply/{property_id}                       submit application (public)
/// /applications                              list
/// /applications/{id}                         get
/// /applications/{id}/approve                 approve (POST)
/// /applications/{id}/reject                  reject (POST)
///
/// /employees                                 list
/// /employees/i9-deadlines                    I-9 Section 2 worklist
/// /employees/{id}                            get
/// /employees/{id}/i9-section2                record Section 2 (POST)
/// /employees/{id}/onboarding-token           re-issue onboarding link (POST)
///
/// /onboarding/welcome/{token}                redeem link (onboarding token)
/// /onboarding/session                        progress (onboarding token)
/// /onboarding/session/steps/{step}           save step (PUT, onboarding token)
/// /onboarding/session/lock                   acquire (POST), release (DELETE)
/// /onboarding/session/complete               finish (POST, onboarding token)
/// /onboarding/invitations                    list, create single-step invite
///
/// /audit-logs                                query (HR only)
/// /audit-logs/verify                         hash chain check (HR only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Staff authentication.
        .nest("/auth", auth::router())
        // Staff accounts.
        .nest("/admin", admin::router())
        .nest("/properties", properties::router())
        // Public application intake.
        .nest("/apply", applications::public_router())
        .nest("/applications", applications::router())
        .nest("/employees", employees::router())
        // Employee-facing onboarding plus staff invitations.
        .nest("/onboarding", onboarding::router())
        .nest("/audit-logs", audit::router())
}
