//! First-run provisioning.
//!
//! A fresh database has no staff accounts, and only HR can create them. When
//! no HR account exists and `BOOTSTRAP_HR_EMAIL` / `BOOTSTRAP_HR_PASSWORD`
//! are set, one HR account is created from them.

use anyhow::{bail, Context};
use innkeep_core::audit::{actions, entities};
use innkeep_core::roles::ROLE_HR;
use innkeep_db::models::audit::CreateAuditLog;
use innkeep_db::models::user::CreateUser;
use innkeep_db::repositories::{AuditLogRepo, UserRepo};
use innkeep_db::DbPool;
use serde_json::json;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};

/// Credentials for the initial HR account.
#[derive(Debug, Clone)]
pub struct BootstrapAccount {
    pub email: String,
    pub password: String,
}

impl BootstrapAccount {
    /// Read `BOOTSTRAP_HR_EMAIL` and `BOOTSTRAP_HR_PASSWORD`. Returns `None`
    /// unless both are set.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("BOOTSTRAP_HR_EMAIL").ok()?;
        let password = std::env::var("BOOTSTRAP_HR_PASSWORD").ok()?;
        Some(Self { email, password })
    }
}

/// Create the bootstrap HR account if no HR account exists yet.
///
/// Returns `true` when an account was created.
pub async fn ensure_hr_account(pool: &DbPool, account: &BootstrapAccount) -> anyhow::Result<bool> {
    let existing = UserRepo::count_by_role(pool, ROLE_HR)
        .await
        .context("Failed to count HR accounts")?;
    if existing > 0 {
        return Ok(false);
    }

    if let Err(msg) = validate_password_strength(&account.password, MIN_PASSWORD_LENGTH) {
        bail!("BOOTSTRAP_HR_PASSWORD rejected: {msg}");
    }
    let password_hash = hash_password(&account.password)
        .map_err(|e| anyhow::anyhow!("Failed to hash bootstrap password: {e}"))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: account.email.trim().to_lowercase(),
            password_hash,
            first_name: "HR".into(),
            last_name: "Administrator".into(),
            role: ROLE_HR.into(),
            property_id: None,
        },
    )
    .await
    .context("Failed to create bootstrap HR account")?;

    AuditLogRepo::record(
        pool,
        &CreateAuditLog::new("system:bootstrap", actions::CREATE, entities::USER, user.id)
            .with_new(json!({ "email": user.email, "role": user.role })),
    )
    .await
    .context("Failed to audit bootstrap HR account")?;

    tracing::info!(user_id = user.id, email = %user.email, "Bootstrap HR account created");
    Ok(true)
}
