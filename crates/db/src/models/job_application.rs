//! Job application model and DTOs.

use innkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `job_applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobApplication {
    pub id: DbId,
    pub property_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub applicant_data: serde_json::Value,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub talent_pool_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl JobApplication {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of the public application form. The property comes from the path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJobApplication {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 30))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    #[validate(length(min = 1, max = 100))]
    pub position: String,
    /// Free-form answers (availability, experience, references, ...).
    #[serde(default)]
    pub applicant_data: Option<serde_json::Value>,
}

/// Filters for the staff application list. `property_id` has already been
/// resolved against the caller's scope.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub property_id: Option<DbId>,
    pub status: Option<String>,
    pub department: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
