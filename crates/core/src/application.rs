//! Job application status machine and job-offer validation.
//!
//! ```text
//! pending ──approve──▶ approved
//!    │
//!    └──reject──▶ rejected | talent_pool
//! ```
//!
//! Every transition starts from `pending`; all three targets are terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a job application, stored as TEXT in
/// `job_applications.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    TalentPool,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::TalentPool,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::TalentPool => "talent_pool",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid application status '{value}'. Must be one of: \
                     pending, approved, rejected, talent_pool"
                ))
            })
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target status for a rejection.
pub fn rejection_status(add_to_talent_pool: bool) -> ApplicationStatus {
    if add_to_talent_pool {
        ApplicationStatus::TalentPool
    } else {
        ApplicationStatus::Rejected
    }
}

/// Check that a review decision may be applied to an application currently
/// in `current` status.
pub fn ensure_reviewable(current: ApplicationStatus) -> Result<(), CoreError> {
    if current.is_terminal() {
        return Err(CoreError::Conflict(format!(
            "Application has already been reviewed (status: {current})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Job offer fields
// ---------------------------------------------------------------------------

pub const PAY_FREQUENCY_HOURLY: &str = "hourly";
pub const PAY_FREQUENCY_SALARY: &str = "salary";
pub const VALID_PAY_FREQUENCIES: &[&str] = &[PAY_FREQUENCY_HOURLY, PAY_FREQUENCY_SALARY];

pub const EMPLOYMENT_FULL_TIME: &str = "full_time";
pub const EMPLOYMENT_PART_TIME: &str = "part_time";
pub const EMPLOYMENT_SEASONAL: &str = "seasonal";
pub const EMPLOYMENT_TEMPORARY: &str = "temporary";
pub const VALID_EMPLOYMENT_TYPES: &[&str] = &[
    EMPLOYMENT_FULL_TIME,
    EMPLOYMENT_PART_TIME,
    EMPLOYMENT_SEASONAL,
    EMPLOYMENT_TEMPORARY,
];

/// Upper bound for an hourly rate; anything above is almost certainly an
/// annual salary entered with the wrong frequency.
const MAX_HOURLY_RATE: f64 = 500.0;

pub fn validate_pay_frequency(value: &str) -> Result<(), CoreError> {
    if VALID_PAY_FREQUENCIES.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid pay_frequency '{value}'. Must be one of: {}",
            VALID_PAY_FREQUENCIES.join(", ")
        )))
    }
}

pub fn validate_employment_type(value: &str) -> Result<(), CoreError> {
    if VALID_EMPLOYMENT_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid employment_type '{value}'. Must be one of: {}",
            VALID_EMPLOYMENT_TYPES.join(", ")
        )))
    }
}

/// Validate a pay rate against its frequency.
pub fn validate_pay_rate(pay_rate: f64, pay_frequency: &str) -> Result<(), CoreError> {
    if !pay_rate.is_finite() || pay_rate <= 0.0 {
        return Err(CoreError::Validation(
            "pay_rate must be a positive number".into(),
        ));
    }
    if pay_frequency == PAY_FREQUENCY_HOURLY && pay_rate > MAX_HOURLY_RATE {
        return Err(CoreError::Validation(format!(
            "Hourly pay_rate must not exceed {MAX_HOURLY_RATE}"
        )));
    }
    Ok(())
}

/// Validate a free-text rejection reason.
pub fn validate_rejection_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::Validation(
            "A rejection reason is required".into(),
        ));
    }
    Ok(())
}
