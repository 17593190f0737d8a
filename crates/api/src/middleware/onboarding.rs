//! Onboarding-token authentication.
//!
//! Employees never log in. Every onboarding request carries the token from
//! their link, and the token is only honoured while its persisted session
//! is usable.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use innkeep_core::error::CoreError;
use innkeep_core::onboarding::{
    ensure_session_readable, OnboardingStep, SessionMode, SessionStatus,
};
use innkeep_db::models::employee::Employee;
use innkeep_db::models::onboarding_session::OnboardingSession;
use innkeep_db::repositories::{EmployeeRepo, OnboardingSessionRepo};

use super::auth::bearer_token;
use crate::auth::jwt::hash_token;
use crate::auth::onboarding_token::{validate_onboarding_token, OnboardingClaims};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// A validated onboarding token together with its session.
#[derive(Debug, Clone)]
pub struct OnboardingContext {
    pub claims: OnboardingClaims,
    pub session: OnboardingSession,
    pub mode: SessionMode,
    pub status: SessionStatus,
    pub target_step: Option<OnboardingStep>,
    /// `None` for single-step invites issued without an employee row.
    pub employee: Option<Employee>,
}

impl OnboardingContext {
    /// Label stored in `audit_logs.actor`.
    pub fn actor(&self) -> String {
        format!("onboarding:{}", self.claims.sub)
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

fn forbidden(msg: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(msg.into()))
}

/// Resolve a raw onboarding token into an [`OnboardingContext`].
///
/// Rejects, in order: a bad signature or expired token (401), a token that
/// is not an onboarding token (403), a token with no session or a session
/// that is revoked or expired (401), and a property or employee mismatch
/// between claims, session and employee row (403). Completed sessions stay
/// readable; handlers that mutate check that separately.
pub async fn authorize_onboarding_token(
    state: &AppState,
    token: &str,
) -> AppResult<OnboardingContext> {
    let claims =
        validate_onboarding_token(token, &state.config.jwt.secret).map_err(CoreError::from)?;

    let session = OnboardingSessionRepo::find_by_token_hash(&state.pool, &hash_token(token))
        .await?
        .ok_or_else(|| unauthorized("Onboarding session not found"))?;

    if session.jti != claims.jti {
        return Err(unauthorized("Onboarding session not found"));
    }

    let mode = SessionMode::parse(&session.mode)?;
    if mode.token_type() != claims.token_type {
        return Err(forbidden("Token type does not match the onboarding session"));
    }

    let status = SessionStatus::parse(&session.status)?;
    let now = Utc::now();
    if session.expires_at <= now
        && matches!(status, SessionStatus::NotStarted | SessionStatus::InProgress)
    {
        OnboardingSessionRepo::mark_expired(&state.pool, session.id).await?;
        tracing::info!(session_id = session.id, "Onboarding session expired");
    }
    ensure_session_readable(status, session.expires_at, now)?;

    if claims.property_id != session.property_id || claims.employee_id != session.employee_id {
        tracing::warn!(session_id = session.id, "Onboarding token claims do not match session");
        return Err(forbidden("Onboarding token does not belong to this property"));
    }

    let employee = match session.employee_id {
        Some(employee_id) => {
            let employee = EmployeeRepo::find_by_id(&state.pool, employee_id)
                .await?
                .ok_or_else(|| unauthorized("Employee record no longer exists"))?;
            if employee.property_id != session.property_id {
                return Err(forbidden("Onboarding token does not belong to this property"));
            }
            Some(employee)
        }
        None => None,
    };

    let target_step = session
        .target_step
        .as_deref()
        .map(OnboardingStep::parse)
        .transpose()?;

    Ok(OnboardingContext {
        claims,
        session,
        mode,
        status,
        target_step,
        employee,
    })
}

/// Extractor for endpoints called with `Authorization: Bearer <onboarding token>`.
pub struct OnboardingSessionAuth(pub OnboardingContext);

impl FromRequestParts<AppState> for OnboardingSessionAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let context = authorize_onboarding_token(state, token).await?;
        Ok(OnboardingSessionAuth(context))
    }
}
