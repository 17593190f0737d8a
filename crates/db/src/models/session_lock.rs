//! Advisory edit lock on an onboarding session.

use innkeep_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `onboarding_session_locks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionLock {
    pub session_id: DbId,
    pub lock_token: String,
    pub holder: String,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
}
