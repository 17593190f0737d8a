//! Onboarding session rules: steps, modes, statuses and token types.
//!
//! A session is either `full` (every step, in order) or `single_step` (one
//! form, usually sent as an invite to update a single document). The
//! session row is the server-side half of an onboarding token; a token is
//! only honoured while its session is usable.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default lifetime of a full onboarding link.
pub const DEFAULT_ONBOARDING_EXPIRY_HOURS: i64 = 72;
/// Default lifetime of a single-step invitation.
pub const DEFAULT_STEP_INVITE_EXPIRY_DAYS: i64 = 7;
/// Default advisory lock duration for a session.
pub const DEFAULT_SESSION_LOCK_MINUTES: i64 = 30;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// A single page of employee paperwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    PersonalInfo,
    EmergencyContacts,
    I9Section1,
    W4Form,
    DirectDeposit,
    HealthInsurance,
    CompanyPolicies,
    TraffickingAwareness,
    WeaponsPolicy,
    FinalReview,
}

impl OnboardingStep {
    /// Steps in the order a full onboarding presents them.
    pub const ALL: [OnboardingStep; 10] = [
        OnboardingStep::PersonalInfo,
        OnboardingStep::EmergencyContacts,
        OnboardingStep::I9Section1,
        OnboardingStep::W4Form,
        OnboardingStep::DirectDeposit,
        OnboardingStep::HealthInsurance,
        OnboardingStep::CompanyPolicies,
        OnboardingStep::TraffickingAwareness,
        OnboardingStep::WeaponsPolicy,
        OnboardingStep::FinalReview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OnboardingStep::PersonalInfo => "personal_info",
            OnboardingStep::EmergencyContacts => "emergency_contacts",
            OnboardingStep::I9Section1 => "i9_section1",
            OnboardingStep::W4Form => "w4_form",
            OnboardingStep::DirectDeposit => "direct_deposit",
            OnboardingStep::HealthInsurance => "health_insurance",
            OnboardingStep::CompanyPolicies => "company_policies",
            OnboardingStep::TraffickingAwareness => "trafficking_awareness",
            OnboardingStep::WeaponsPolicy => "weapons_policy",
            OnboardingStep::FinalReview => "final_review",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown onboarding step '{value}'")))
    }

    /// Human-readable title used in emails and the welcome payload.
    pub fn title(self) -> &'static str {
        match self {
            OnboardingStep::PersonalInfo => "Personal Information",
            OnboardingStep::EmergencyContacts => "Emergency Contacts",
            OnboardingStep::I9Section1 => "Form I-9, Section 1",
            OnboardingStep::W4Form => "Form W-4",
            OnboardingStep::DirectDeposit => "Direct Deposit",
            OnboardingStep::HealthInsurance => "Health Insurance",
            OnboardingStep::CompanyPolicies => "Company Policies",
            OnboardingStep::TraffickingAwareness => "Human Trafficking Awareness",
            OnboardingStep::WeaponsPolicy => "Weapons Policy",
            OnboardingStep::FinalReview => "Review & Sign",
        }
    }

    /// Steps that may be sent on their own as a single-step invitation.
    /// The final review only makes sense at the end of a full onboarding.
    pub fn is_invitable(self) -> bool {
        !matches!(self, OnboardingStep::FinalReview)
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Session mode / status / token type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Full,
    SingleStep,
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Full => "full",
            SessionMode::SingleStep => "single_step",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "full" => Ok(SessionMode::Full),
            "single_step" => Ok(SessionMode::SingleStep),
            other => Err(CoreError::Internal(format!("Unknown session mode '{other}'"))),
        }
    }

    /// The token type that must be presented for sessions of this mode.
    pub fn token_type(self) -> TokenType {
        match self {
            SessionMode::Full => TokenType::Onboarding,
            SessionMode::SingleStep => TokenType::SingleStep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
    Expired,
    Revoked,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "not_started",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Expired => "expired",
            SessionStatus::Revoked => "revoked",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "not_started" => Ok(SessionStatus::NotStarted),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "expired" => Ok(SessionStatus::Expired),
            "revoked" => Ok(SessionStatus::Revoked),
            other => Err(CoreError::Internal(format!(
                "Unknown session status '{other}'"
            ))),
        }
    }
}

/// The `token_type` claim of an onboarding token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Onboarding,
    SingleStep,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Onboarding => "onboarding",
            TokenType::SingleStep => "single_step",
        }
    }
}

/// Employee-level onboarding progress, stored in `employees.onboarding_status`.
pub mod employee_status {
    pub const NOT_STARTED: &str = "not_started";
    pub const IN_PROGRESS: &str = "in_progress";
    pub const EMPLOYEE_COMPLETED: &str = "employee_completed";
}

// ---------------------------------------------------------------------------
// Session usability
// ---------------------------------------------------------------------------

/// A session may be read while it is not revoked and not past its expiry.
pub fn ensure_session_readable(
    status: SessionStatus,
    expires_at: Timestamp,
    now: Timestamp,
) -> Result<(), CoreError> {
    match status {
        SessionStatus::Revoked => Err(CoreError::Unauthorized(
            "Onboarding link has been revoked".into(),
        )),
        SessionStatus::Expired => Err(CoreError::Unauthorized(
            "Onboarding link has expired".into(),
        )),
        _ if expires_at <= now => Err(CoreError::Unauthorized(
            "Onboarding link has expired".into(),
        )),
        _ => Ok(()),
    }
}

/// A session may be mutated while readable and not yet completed.
pub fn ensure_session_mutable(
    status: SessionStatus,
    expires_at: Timestamp,
    now: Timestamp,
) -> Result<(), CoreError> {
    ensure_session_readable(status, expires_at, now)?;
    if status == SessionStatus::Completed {
        return Err(CoreError::Conflict(
            "Onboarding session is already completed".into(),
        ));
    }
    Ok(())
}

/// Check that `step` may be submitted in a session of the given shape.
pub fn ensure_step_allowed(
    mode: SessionMode,
    target_step: Option<OnboardingStep>,
    step: OnboardingStep,
) -> Result<(), CoreError> {
    match (mode, target_step) {
        (SessionMode::Full, _) => Ok(()),
        (SessionMode::SingleStep, Some(target)) if target == step => Ok(()),
        (SessionMode::SingleStep, Some(target)) => Err(CoreError::Forbidden(format!(
            "This link only allows the '{target}' step"
        ))),
        (SessionMode::SingleStep, None) => Err(CoreError::Internal(
            "Single-step session has no target step".into(),
        )),
    }
}

/// Steps a session must complete before it can be finished.
pub fn required_steps(mode: SessionMode, target_step: Option<OnboardingStep>) -> Vec<OnboardingStep> {
    match (mode, target_step) {
        (SessionMode::Full, _) => OnboardingStep::ALL.to_vec(),
        (SessionMode::SingleStep, Some(target)) => vec![target],
        (SessionMode::SingleStep, None) => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StepProgress {
    pub step: OnboardingStep,
    pub title: &'static str,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionProgress {
    pub steps: Vec<StepProgress>,
    pub completed_count: usize,
    pub total: usize,
    pub percent: u8,
    pub next_step: Option<OnboardingStep>,
    pub can_complete: bool,
}

/// Build the progress view from the persisted `completed_steps` column.
///
/// Unknown step names in `completed` are ignored.
pub fn build_progress(
    mode: SessionMode,
    target_step: Option<OnboardingStep>,
    completed: &[String],
) -> SessionProgress {
    let steps: Vec<StepProgress> = required_steps(mode, target_step)
        .into_iter()
        .map(|step| StepProgress {
            step,
            title: step.title(),
            completed: completed.iter().any(|c| c == step.as_str()),
        })
        .collect();

    let total = steps.len();
    let completed_count = steps.iter().filter(|s| s.completed).count();
    let percent = if total == 0 {
        0
    } else {
        ((completed_count * 100) / total) as u8
    };
    let next_step = steps.iter().find(|s| !s.completed).map(|s| s.step);

    SessionProgress {
        can_complete: total > 0 && completed_count == total,
        steps,
        completed_count,
        total,
        percent,
        next_step,
    }
}

/// Steps still missing before the session can be completed.
pub fn missing_steps(
    mode: SessionMode,
    target_step: Option<OnboardingStep>,
    completed: &[String],
) -> Vec<OnboardingStep> {
    required_steps(mode, target_step)
        .into_iter()
        .filter(|step| !completed.iter().any(|c| c == step.as_str()))
        .collect()
}

/// A lock whose expiry has passed may be taken over by another holder.
pub fn lock_is_stale(expires_at: Timestamp, now: Timestamp) -> bool {
    expires_at <= now
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    fn names(steps: &[OnboardingStep]) -> Vec<String> {
        steps.iter().map(|s| s.as_str().to_string()).collect()
    }

    #[test]
    fn step_names_round_trip() {
        for step in OnboardingStep::ALL {
            assert_eq!(OnboardingStep::parse(step.as_str()).unwrap(), step);
        }
        assert!(OnboardingStep::parse("i9_section2").is_err());
    }

    #[test]
    fn step_serde_matches_as_str() {
        let json = serde_json::to_value(OnboardingStep::I9Section1).unwrap();
        assert_eq!(json, "i9_section1");
        let json = serde_json::to_value(OnboardingStep::W4Form).unwrap();
        assert_eq!(json, "w4_form");
    }

    #[test]
    fn mode_maps_to_token_type() {
        assert_eq!(SessionMode::Full.token_type(), TokenType::Onboarding);
        assert_eq!(SessionMode::SingleStep.token_type(), TokenType::SingleStep);
    }

    #[test]
    fn expired_session_is_not_readable() {
        let now = Utc::now();
        let result =
            ensure_session_readable(SessionStatus::InProgress, now - Duration::seconds(1), now);
        assert_matches!(result, Err(CoreError::Unauthorized(_)));
    }

    #[test]
    fn revoked_session_is_not_readable() {
        let now = Utc::now();
        let result =
            ensure_session_readable(SessionStatus::Revoked, now + Duration::hours(1), now);
        assert_matches!(result, Err(CoreError::Unauthorized(_)));
    }

    #[test]
    fn completed_session_is_readable_but_not_mutable() {
        let now = Utc::now();
        let expires = now + Duration::hours(1);
        assert!(ensure_session_readable(SessionStatus::Completed, expires, now).is_ok());
        assert_matches!(
            ensure_session_mutable(SessionStatus::Completed, expires, now),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn active_session_is_mutable() {
        let now = Utc::now();
        let expires = now + Duration::hours(72);
        assert!(ensure_session_mutable(SessionStatus::NotStarted, expires, now).is_ok());
        assert!(ensure_session_mutable(SessionStatus::InProgress, expires, now).is_ok());
    }

    #[test]
    fn single_step_session_only_allows_target() {
        let target = Some(OnboardingStep::W4Form);
        assert!(ensure_step_allowed(SessionMode::SingleStep, target, OnboardingStep::W4Form).is_ok());
        assert_matches!(
            ensure_step_allowed(SessionMode::SingleStep, target, OnboardingStep::DirectDeposit),
            Err(CoreError::Forbidden(_))
        );
        assert!(ensure_step_allowed(SessionMode::Full, None, OnboardingStep::DirectDeposit).is_ok());
    }

    #[test]
    fn progress_for_fresh_full_session() {
        let progress = build_progress(SessionMode::Full, None, &[]);
        assert_eq!(progress.total, OnboardingStep::ALL.len());
        assert_eq!(progress.completed_count, 0);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.next_step, Some(OnboardingStep::PersonalInfo));
        assert!(!progress.can_complete);
    }

    #[test]
    fn progress_skips_completed_steps() {
        let completed = names(&[OnboardingStep::PersonalInfo, OnboardingStep::I9Section1]);
        let progress = build_progress(SessionMode::Full, None, &completed);
        assert_eq!(progress.completed_count, 2);
        assert_eq!(progress.percent, 20);
        assert_eq!(progress.next_step, Some(OnboardingStep::EmergencyContacts));
    }

    #[test]
    fn full_progress_can_complete() {
        let completed = names(&OnboardingStep::ALL);
        let progress = build_progress(SessionMode::Full, None, &completed);
        assert_eq!(progress.percent, 100);
        assert!(progress.can_complete);
        assert!(progress.next_step.is_none());
        assert!(missing_steps(SessionMode::Full, None, &completed).is_empty());
    }

    #[test]
    fn single_step_progress_has_one_step() {
        let progress =
            build_progress(SessionMode::SingleStep, Some(OnboardingStep::DirectDeposit), &[]);
        assert_eq!(progress.total, 1);
        assert_eq!(progress.next_step, Some(OnboardingStep::DirectDeposit));

        let missing = missing_steps(
            SessionMode::SingleStep,
            Some(OnboardingStep::DirectDeposit),
            &names(&[OnboardingStep::DirectDeposit]),
        );
        assert!(missing.is_empty());
    }

    #[test]
    fn unknown_completed_names_are_ignored() {
        let completed = vec!["legacy_step".to_string()];
        let progress = build_progress(SessionMode::Full, None, &completed);
        assert_eq!(progress.completed_count, 0);
    }

    #[test]
    fn final_review_is_not_invitable() {
        assert!(!OnboardingStep::FinalReview.is_invitable());
        assert!(OnboardingStep::W4Form.is_invitable());
    }

    #[test]
    fn lock_staleness() {
        let now = Utc::now();
        assert!(lock_is_stale(now - Duration::minutes(1), now));
        assert!(!lock_is_stale(now + Duration::minutes(1), now));
    }
}
