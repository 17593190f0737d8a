//! Repository for the `onboarding_session_locks` table.

use innkeep_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session_lock::SessionLock;

const COLUMNS: &str = "session_id, lock_token, holder, acquired_at, expires_at";

pub struct SessionLockRepo;

impl SessionLockRepo {
    /// Acquire or refresh the lock on a session.
    ///
    /// Succeeds when no lock exists, the existing lock has expired, or the
    /// same holder already owns it. Returns `None` when another holder has a
    /// live lock.
    pub async fn acquire(
        pool: &PgPool,
        session_id: DbId,
        lock_token: &str,
        holder: &str,
        expires_at: Timestamp,
    ) -> Result<Option<SessionLock>, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_session_locks (session_id, lock_token, holder, acquired_at, expires_at)
             VALUES ($1, $2, $3, NOW(), $4)
             ON CONFLICT (session_id) DO UPDATE SET
                lock_token = EXCLUDED.lock_token,
                holder = EXCLUDED.holder,
                acquired_at = NOW(),
                expires_at = EXCLUDED.expires_at
             WHERE onboarding_session_locks.expires_at <= NOW()
                OR onboarding_session_locks.holder = EXCLUDED.holder
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionLock>(&query)
            .bind(session_id)
            .bind(lock_token)
            .bind(holder)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// The lock row for a session, live or stale.
    pub async fn find(pool: &PgPool, session_id: DbId) -> Result<Option<SessionLock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_session_locks WHERE session_id = $1");
        sqlx::query_as::<_, SessionLock>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Release a lock. Only the matching lock token may release it.
    pub async fn release(
        pool: &PgPool,
        session_id: DbId,
        lock_token: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM onboarding_session_locks WHERE session_id = $1 AND lock_token = $2",
        )
        .bind(session_id)
        .bind(lock_token)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop any lock on a session (used when the session closes).
    pub async fn clear(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        session_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM onboarding_session_locks WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
