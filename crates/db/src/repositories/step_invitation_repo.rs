//! Repository for the `step_invitations` table.

use innkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::step_invitation::{CreateStepInvitation, StepInvitation};

const COLUMNS: &str = "id, session_id, property_id, employee_id, step, recipient_email, \
                       recipient_name, sent_by, created_at";

pub struct StepInvitationRepo;

impl StepInvitationRepo {
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateStepInvitation,
    ) -> Result<StepInvitation, sqlx::Error> {
        let query = format!(
            "INSERT INTO step_invitations
                (session_id, property_id, employee_id, step, recipient_email, recipient_name, sent_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StepInvitation>(&query)
            .bind(input.session_id)
            .bind(input.property_id)
            .bind(input.employee_id)
            .bind(&input.step)
            .bind(&input.recipient_email)
            .bind(&input.recipient_name)
            .bind(input.sent_by)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        property_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StepInvitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM step_invitations
             WHERE ($1::BIGINT IS NULL OR property_id = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, StepInvitation>(&query)
            .bind(property_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, property_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM step_invitations
             WHERE ($1::BIGINT IS NULL OR property_id = $1)",
        )
        .bind(property_id)
        .fetch_one(pool)
        .await
    }
}
