//! Employee model and DTOs.

use innkeep_core::types::{Date, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `employees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    pub application_id: DbId,
    pub property_id: DbId,
    pub manager_id: Option<DbId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub job_title: String,
    pub pay_rate: f64,
    pub pay_frequency: String,
    pub employment_type: String,
    pub start_date: Date,
    pub supervisor: String,
    pub onboarding_status: String,
    pub onboarding_completed_at: Option<Timestamp>,
    pub i9_section1_deadline: Date,
    pub i9_section2_deadline: Date,
    pub i9_section2_completed_at: Option<Timestamp>,
    pub i9_section2_completed_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Insert DTO assembled by the approval workflow.
#[derive(Debug, Clone)]
pub struct CreateEmployee {
    pub application_id: DbId,
    pub property_id: DbId,
    pub manager_id: Option<DbId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub job_title: String,
    pub pay_rate: f64,
    pub pay_frequency: String,
    pub employment_type: String,
    pub start_date: Date,
    pub supervisor: String,
    pub i9_section1_deadline: Date,
    pub i9_section2_deadline: Date,
}
