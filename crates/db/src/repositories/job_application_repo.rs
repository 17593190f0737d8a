//! Repository for the `job_applications` table.
//!
//! Review transitions are conditional on `status = 'pending'` so that an
//! application reaches a terminal state at most once, even under concurrent
//! reviewers.

use innkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::job_application::{ApplicationFilter, CreateJobApplication, JobApplication};

const COLUMNS: &str = "id, property_id, first_name, last_name, email, phone, department, \
                       position, applicant_data, status, rejection_reason, reviewed_by, \
                       reviewed_at, talent_pool_at, created_at, updated_at";

pub struct JobApplicationRepo;

impl JobApplicationRepo {
    /// Insert a new pending application.
    ///
    /// A second pending application for the same email, property and
    /// position violates `uq_job_applications_pending`.
    pub async fn create(
        pool: &PgPool,
        property_id: DbId,
        input: &CreateJobApplication,
    ) -> Result<JobApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO job_applications
                (property_id, first_name, last_name, email, phone, department, position, applicant_data)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobApplication>(&query)
            .bind(property_id)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(input.email.trim())
            .bind(&input.phone)
            .bind(&input.department)
            .bind(&input.position)
            .bind(&input.applicant_data)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<JobApplication>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM job_applications WHERE id = $1");
        sqlx::query_as::<_, JobApplication>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock and load an application inside a review transaction.
    pub async fn find_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<JobApplication>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM job_applications WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, JobApplication>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List applications newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ApplicationFilter,
    ) -> Result<Vec<JobApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM job_applications
             WHERE ($1::BIGINT IS NULL OR property_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::TEXT IS NULL OR department = $3)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, JobApplication>(&query)
            .bind(filter.property_id)
            .bind(&filter.status)
            .bind(&filter.department)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Count applications matching `filter` (ignores limit/offset).
    pub async fn count(pool: &PgPool, filter: &ApplicationFilter) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM job_applications
             WHERE ($1::BIGINT IS NULL OR property_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::TEXT IS NULL OR department = $3)",
        )
        .bind(filter.property_id)
        .bind(&filter.status)
        .bind(&filter.department)
        .fetch_one(pool)
        .await
    }

    /// Transition a pending application to `approved`.
    ///
    /// Returns `None` when the row is missing or no longer pending.
    pub async fn mark_approved(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        reviewer_id: DbId,
    ) -> Result<Option<JobApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE job_applications SET
                status = 'approved',
                reviewed_by = $2,
                reviewed_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobApplication>(&query)
            .bind(id)
            .bind(reviewer_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Transition a pending application to `rejected` or `talent_pool`.
    ///
    /// Returns `None` when the row is missing or no longer pending.
    pub async fn mark_rejected(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        status: &str,
        reason: &str,
        reviewer_id: DbId,
    ) -> Result<Option<JobApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE job_applications SET
                status = $2,
                rejection_reason = $3,
                reviewed_by = $4,
                reviewed_at = NOW(),
                talent_pool_at = CASE WHEN $2 = 'talent_pool' THEN NOW() ELSE NULL END
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobApplication>(&query)
            .bind(id)
            .bind(status)
            .bind(reason)
            .bind(reviewer_id)
            .fetch_optional(&mut **tx)
            .await
    }
}
