//! Repository for the `employees` table.

use innkeep_core::onboarding::employee_status;
use innkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::employee::{CreateEmployee, Employee};

const COLUMNS: &str = "id, application_id, property_id, manager_id, first_name, last_name, \
                       email, phone, department, job_title, pay_rate, pay_frequency, \
                       employment_type, start_date, supervisor, onboarding_status, \
                       onboarding_completed_at, i9_section1_deadline, i9_section2_deadline, \
                       i9_section2_completed_at, i9_section2_completed_by, created_at, updated_at";

pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert the employee created by an approval.
    ///
    /// `uq_employees_application` guarantees one employee per application.
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateEmployee,
    ) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees
                (application_id, property_id, manager_id, first_name, last_name, email, phone,
                 department, job_title, pay_rate, pay_frequency, employment_type, start_date,
                 supervisor, i9_section1_deadline, i9_section2_deadline)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(input.application_id)
            .bind(input.property_id)
            .bind(input.manager_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.department)
            .bind(&input.job_title)
            .bind(input.pay_rate)
            .bind(&input.pay_frequency)
            .bind(&input.employment_type)
            .bind(input.start_date)
            .bind(&input.supervisor)
            .bind(input.i9_section1_deadline)
            .bind(input.i9_section2_deadline)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count_for_application(
        pool: &PgPool,
        application_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM employees WHERE application_id = $1")
            .bind(application_id)
            .fetch_one(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        property_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employees
             WHERE ($1::BIGINT IS NULL OR property_id = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(property_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, property_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM employees WHERE ($1::BIGINT IS NULL OR property_id = $1)",
        )
        .bind(property_id)
        .fetch_one(pool)
        .await
    }

    /// Employees whose I-9 Section 2 is still outstanding, soonest deadline first.
    pub async fn list_i9_pending(
        pool: &PgPool,
        property_id: Option<DbId>,
    ) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employees
             WHERE i9_section2_completed_at IS NULL
               AND ($1::BIGINT IS NULL OR property_id = $1)
             ORDER BY i9_section2_deadline ASC, id ASC"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(property_id)
            .fetch_all(pool)
            .await
    }

    /// Record employer completion of I-9 Section 2.
    ///
    /// Returns `None` if the employee does not exist or Section 2 was
    /// already recorded.
    pub async fn complete_i9_section2(
        pool: &PgPool,
        id: DbId,
        completed_by: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "UPDATE employees SET
                i9_section2_completed_at = NOW(),
                i9_section2_completed_by = $2
             WHERE id = $1 AND i9_section2_completed_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(completed_by)
            .fetch_optional(pool)
            .await
    }

    /// Move `not_started` to `in_progress` on the first visit. No-op otherwise.
    pub async fn mark_onboarding_started(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE employees SET onboarding_status = $2
             WHERE id = $1 AND onboarding_status = $3",
        )
        .bind(id)
        .bind(employee_status::IN_PROGRESS)
        .bind(employee_status::NOT_STARTED)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn mark_onboarding_completed(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "UPDATE employees SET
                onboarding_status = $2,
                onboarding_completed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(employee_status::EMPLOYEE_COMPLETED)
            .fetch_optional(&mut **tx)
            .await
    }
}
