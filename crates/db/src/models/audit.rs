//! Audit log models and DTOs.
//!
//! Audit rows are immutable, so there is no `updated_at` and no update DTO.

use innkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single audit log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub created_at: Timestamp,
    pub user_id: Option<DbId>,
    pub actor: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: DbId,
    pub property_id: Option<DbId>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub integrity_hash: String,
}

/// Insert DTO. Values are redacted and hashed by the repository.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub user_id: Option<DbId>,
    pub actor: String,
    pub action: &'static str,
    pub entity_type: &'static str,
    pub entity_id: DbId,
    pub property_id: Option<DbId>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

impl CreateAuditLog {
    pub fn new(
        actor: impl Into<String>,
        action: &'static str,
        entity_type: &'static str,
        entity_id: DbId,
    ) -> Self {
        Self {
            user_id: None,
            actor: actor.into(),
            action,
            entity_type,
            entity_id,
            property_id: None,
            old_values: None,
            new_values: None,
            ip_address: None,
        }
    }

    pub fn by_user(mut self, user_id: DbId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn in_property(mut self, property_id: DbId) -> Self {
        self.property_id = Some(property_id);
        self
    }

    pub fn with_old(mut self, values: serde_json::Value) -> Self {
        self.old_values = Some(values);
        self
    }

    pub fn with_new(mut self, values: serde_json::Value) -> Self {
        self.new_values = Some(values);
        self
    }
}

/// Filter parameters for querying audit logs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub user_id: Option<DbId>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub property_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
