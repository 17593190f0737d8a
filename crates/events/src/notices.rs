//! Typed payloads for notification events.
//!
//! The API serializes one of these into [`DomainEvent::payload`]; the
//! templates deserialize it back. Recipient data travels with the event so
//! the notifier needs no database access.
//!
//! [`DomainEvent::payload`]: crate::bus::DomainEvent::payload

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// `application.submitted`: confirmation to the applicant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationReceived {
    pub applicant_email: String,
    pub applicant_name: String,
    pub property_name: String,
    pub position: String,
}

/// `application.approved`: job offer with the onboarding link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferNotice {
    pub employee_email: String,
    pub employee_name: String,
    pub property_name: String,
    pub job_title: String,
    pub start_date: NaiveDate,
    pub pay_rate: f64,
    pub pay_frequency: String,
    pub supervisor: String,
    pub onboarding_url: String,
    pub expires_at: DateTime<Utc>,
}

/// `application.rejected` and `application.talent_pool`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionNotice {
    pub applicant_email: String,
    pub applicant_name: String,
    pub property_name: String,
    pub position: String,
    pub talent_pool: bool,
}

/// `onboarding.invitation`: a single form to fill in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationNotice {
    pub recipient_email: String,
    pub recipient_name: Option<String>,
    pub property_name: String,
    pub step_title: String,
    pub form_url: String,
    pub expires_at: DateTime<Utc>,
}

/// `onboarding.completed`: tells the assigned manager the paperwork is in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionNotice {
    pub manager_email: Option<String>,
    pub employee_name: String,
    pub property_name: String,
    pub job_title: String,
    pub start_date: Option<NaiveDate>,
}
