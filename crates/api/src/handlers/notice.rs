//! Lookups that only feed outgoing notices.
//!
//! These run after the request's transaction has committed, so a failure
//! here must not fail the request. Errors are logged and a fallback is used.

use innkeep_core::types::DbId;
use innkeep_db::repositories::{PropertyRepo, UserRepo};
use innkeep_db::DbPool;

/// Property name for an email body, or an empty string if it cannot be read.
pub async fn property_name(pool: &DbPool, property_id: DbId) -> String {
    match PropertyRepo::find_by_id(pool, property_id).await {
        Ok(property) => property.map(|p| p.name).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(property_id, error = %e, "Property lookup for notice failed");
            String::new()
        }
    }
}

/// Email address of the assigned manager, if there is one and it can be read.
pub async fn manager_email(pool: &DbPool, manager_id: Option<DbId>) -> Option<String> {
    let manager_id = manager_id?;
    match UserRepo::find_by_id(pool, manager_id).await {
        Ok(manager) => manager.map(|m| m.email),
        Err(e) => {
            tracing::warn!(manager_id, error = %e, "Manager lookup for notice failed");
            None
        }
    }
}
