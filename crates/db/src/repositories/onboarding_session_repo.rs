//! Repository for the `onboarding_sessions` table.
//!
//! Every mutating query re-checks status and expiry in its WHERE clause, so
//! a session that expires or is revoked between validation and write is
//! never modified.

use innkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::onboarding_session::{CreateOnboardingSession, OnboardingSession};

const COLUMNS: &str = "id, employee_id, property_id, manager_id, created_by, subject, email, \
                       mode, target_step, token_hash, jti, status, completed_steps, step_data, \
                       expires_at, started_at, completed_at, revoked_at, created_at, updated_at";

/// Statuses in which a session still accepts writes.
const OPEN_STATUSES: &str = "('not_started', 'in_progress')";

pub struct OnboardingSessionRepo;

impl OnboardingSessionRepo {
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateOnboardingSession,
    ) -> Result<OnboardingSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_sessions
                (employee_id, property_id, manager_id, created_by, subject, email, mode,
                 target_step, token_hash, jti, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(input.employee_id)
            .bind(input.property_id)
            .bind(input.manager_id)
            .bind(input.created_by)
            .bind(&input.subject)
            .bind(&input.email)
            .bind(&input.mode)
            .bind(&input.target_step)
            .bind(&input.token_hash)
            .bind(&input.jti)
            .bind(input.expires_at)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_sessions WHERE id = $1");
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_sessions WHERE token_hash = $1");
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_employee(
        pool: &PgPool,
        employee_id: DbId,
    ) -> Result<Vec<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_sessions
             WHERE employee_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(employee_id)
            .fetch_all(pool)
            .await
    }

    /// Revoke every open full-onboarding session of an employee. Returns the
    /// ids of the revoked rows.
    pub async fn revoke_open_for_employee(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        employee_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET status = 'revoked', revoked_at = NOW()
             WHERE employee_id = $1 AND mode = 'full' AND status IN {OPEN_STATUSES}
             RETURNING id"
        );
        sqlx::query_scalar::<_, DbId>(&query)
            .bind(employee_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Record the first visit: `not_started` becomes `in_progress`.
    ///
    /// Returns the current row either way, or `None` if the session is no
    /// longer open.
    pub async fn mark_started(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET
                status = 'in_progress',
                started_at = COALESCE(started_at, NOW())
             WHERE id = $1 AND status IN {OPEN_STATUSES} AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Persist one step's data and add it to `completed_steps`.
    ///
    /// Re-saving a step overwrites its data without duplicating the entry in
    /// `completed_steps`.
    pub async fn save_step(
        pool: &PgPool,
        id: DbId,
        step: &str,
        data: &serde_json::Value,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET
                step_data = jsonb_set(step_data, ARRAY[$2::TEXT], $3::JSONB, true),
                completed_steps = CASE
                    WHEN $2::TEXT = ANY(completed_steps) THEN completed_steps
                    ELSE array_append(completed_steps, $2::TEXT)
                END,
                status = 'in_progress',
                started_at = COALESCE(started_at, NOW())
             WHERE id = $1 AND status IN {OPEN_STATUSES} AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .bind(step)
            .bind(data)
            .fetch_optional(pool)
            .await
    }

    /// Close a session after all required steps are saved.
    pub async fn complete(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET status = 'completed', completed_at = NOW()
             WHERE id = $1 AND status IN {OPEN_STATUSES} AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Flag a session whose expiry has passed. Returns `true` if it changed.
    pub async fn mark_expired(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET status = 'expired'
             WHERE id = $1 AND status IN {OPEN_STATUSES} AND expires_at <= NOW()"
        );
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
