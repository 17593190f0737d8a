//! Onboarding session issuance.
//!
//! Approval, staff re-issue and single-step invitations all mint a token
//! and persist its session in the caller's transaction, so a token never
//! exists without its session row.

use chrono::Duration;
use innkeep_core::audit::{actions, entities};
use innkeep_core::onboarding::{OnboardingStep, SessionMode};
use innkeep_core::types::{DbId, Timestamp};
use innkeep_db::models::audit::CreateAuditLog;
use innkeep_db::models::onboarding_session::{CreateOnboardingSession, OnboardingSession};
use innkeep_db::repositories::{AuditLogRepo, OnboardingSessionRepo};
use serde_json::json;

use crate::auth::onboarding_token::{issue_token, TokenRequest};
use crate::config::OnboardingConfig;
use crate::error::{AppError, AppResult};

/// What to issue.
#[derive(Debug, Clone)]
pub struct SessionRequest<'a> {
    pub employee_id: Option<DbId>,
    pub property_id: DbId,
    pub manager_id: Option<DbId>,
    /// Staff user issuing the session.
    pub created_by: DbId,
    pub email: &'a str,
    pub mode: SessionMode,
    pub target_step: Option<OnboardingStep>,
    pub expires_at: Timestamp,
}

/// A persisted session and the plaintext token that unlocks it.
///
/// The plaintext is only ever returned to the issuer; the database keeps
/// its hash.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session: OnboardingSession,
    pub token: String,
}

pub fn full_onboarding_expiry(config: &OnboardingConfig, now: Timestamp) -> Timestamp {
    now + Duration::hours(config.token_expiry_hours)
}

pub fn step_invite_expiry(config: &OnboardingConfig, now: Timestamp) -> Timestamp {
    now + Duration::days(config.step_invite_expiry_days)
}

/// Sign a token, persist its session and record an `issue_token` audit entry.
pub async fn issue_session(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    secret: &str,
    request: &SessionRequest<'_>,
) -> AppResult<IssuedSession> {
    let issued = issue_token(
        &TokenRequest {
            employee_id: request.employee_id,
            property_id: request.property_id,
            email: request.email,
            token_type: request.mode.token_type(),
            expires_at: request.expires_at,
        },
        secret,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let session = OnboardingSessionRepo::create(
        tx,
        &CreateOnboardingSession {
            employee_id: request.employee_id,
            property_id: request.property_id,
            manager_id: request.manager_id,
            created_by: Some(request.created_by),
            subject: issued.claims.sub.clone(),
            email: request.email.to_string(),
            mode: request.mode.as_str().to_string(),
            target_step: request.target_step.map(|s| s.as_str().to_string()),
            token_hash: issued.token_hash.clone(),
            jti: issued.claims.jti.clone(),
            expires_at: request.expires_at,
        },
    )
    .await?;

    AuditLogRepo::append(
        tx,
        &CreateAuditLog::new(
            format!("user:{}", request.created_by),
            actions::ISSUE_TOKEN,
            entities::ONBOARDING_SESSION,
            session.id,
        )
        .by_user(request.created_by)
        .in_property(session.property_id)
        .with_new(json!({
            "employee_id": session.employee_id,
            "mode": session.mode,
            "target_step": session.target_step,
            "expires_at": session.expires_at,
        })),
    )
    .await?;

    tracing::info!(
        session_id = session.id,
        employee_id = ?session.employee_id,
        mode = %session.mode,
        "Onboarding session issued"
    );

    Ok(IssuedSession {
        session,
        token: issued.token,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn expiry_windows_follow_config() {
        let config = OnboardingConfig::default();
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap();
        assert_eq!(
            full_onboarding_expiry(&config, now),
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
        );
        assert_eq!(
            step_invite_expiry(&config, now),
            Utc.with_ymd_and_hms(2026, 10, 22, 9, 0, 0).unwrap()
        );
    }
}
