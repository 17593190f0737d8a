//! Single-step form invitation model.

use innkeep_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `step_invitations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StepInvitation {
    pub id: DbId,
    pub session_id: DbId,
    pub property_id: DbId,
    pub employee_id: Option<DbId>,
    pub step: String,
    pub recipient_email: String,
    pub recipient_name: Option<String>,
    pub sent_by: Option<DbId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateStepInvitation {
    pub session_id: DbId,
    pub property_id: DbId,
    pub employee_id: Option<DbId>,
    pub step: String,
    pub recipient_email: String,
    pub recipient_name: Option<String>,
    pub sent_by: Option<DbId>,
}
