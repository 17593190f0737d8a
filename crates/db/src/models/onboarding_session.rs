//! Onboarding session model and DTOs.

use innkeep_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `onboarding_sessions` table.
///
/// Never carries the token itself; only its SHA-256 hash and `jti`.
#[derive(Debug, Clone, FromRow)]
pub struct OnboardingSession {
    pub id: DbId,
    pub employee_id: Option<DbId>,
    pub property_id: DbId,
    pub manager_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub subject: String,
    pub email: String,
    pub mode: String,
    pub target_step: Option<String>,
    pub token_hash: String,
    pub jti: String,
    pub status: String,
    pub completed_steps: Vec<String>,
    pub step_data: serde_json::Value,
    pub expires_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Response shape for staff-facing endpoints (no hash, no step data).
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingSessionSummary {
    pub id: DbId,
    pub employee_id: Option<DbId>,
    pub property_id: DbId,
    pub mode: String,
    pub target_step: Option<String>,
    pub status: String,
    pub completed_steps: Vec<String>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl From<&OnboardingSession> for OnboardingSessionSummary {
    fn from(s: &OnboardingSession) -> Self {
        Self {
            id: s.id,
            employee_id: s.employee_id,
            property_id: s.property_id,
            mode: s.mode.clone(),
            target_step: s.target_step.clone(),
            status: s.status.clone(),
            completed_steps: s.completed_steps.clone(),
            expires_at: s.expires_at,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateOnboardingSession {
    pub employee_id: Option<DbId>,
    pub property_id: DbId,
    pub manager_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub subject: String,
    pub email: String,
    pub mode: String,
    pub target_step: Option<String>,
    pub token_hash: String,
    pub jti: String,
    pub expires_at: Timestamp,
}
