//! Repository for the append-only `audit_logs` table.
//!
//! Inserts are serialized with a transaction-scoped advisory lock so that
//! each entry chains onto the true latest hash.

use innkeep_core::audit::{canonical_entry_data, compute_integrity_hash, redact_sensitive_fields};
use innkeep_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::audit::{AuditLog, AuditQuery, CreateAuditLog};

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, created_at, user_id, actor, action, entity_type, entity_id, \
    property_id, old_values, new_values, ip_address, integrity_hash";

/// Advisory lock key guarding the hash chain.
const CHAIN_LOCK_KEY: i64 = 0x1A0D_17C4;

pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one entry inside the caller's transaction.
    ///
    /// Old/new values are redacted before they are hashed and stored.
    pub async fn append(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &CreateAuditLog,
    ) -> Result<AuditLog, sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(CHAIN_LOCK_KEY)
            .execute(&mut **tx)
            .await?;

        let prev_hash = sqlx::query_scalar::<_, String>(
            "SELECT integrity_hash FROM audit_logs ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&mut **tx)
        .await?;

        let old_values = entry.old_values.as_ref().map(redact_sensitive_fields);
        let new_values = entry.new_values.as_ref().map(redact_sensitive_fields);
        let entity_id = entry.entity_id.to_string();
        let data = canonical_entry_data(
            entry.action,
            entry.entity_type,
            &entity_id,
            &entry.actor,
            new_values.as_ref(),
        );
        let integrity_hash = compute_integrity_hash(prev_hash.as_deref(), &data);

        let query = format!(
            "INSERT INTO audit_logs
                (user_id, actor, action, entity_type, entity_id, property_id,
                 old_values, new_values, ip_address, integrity_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(entry.user_id)
            .bind(&entry.actor)
            .bind(entry.action)
            .bind(entry.entity_type)
            .bind(entry.entity_id)
            .bind(entry.property_id)
            .bind(&old_values)
            .bind(&new_values)
            .bind(&entry.ip_address)
            .bind(&integrity_hash)
            .fetch_one(&mut **tx)
            .await
    }

    /// Append one entry in its own transaction.
    pub async fn record(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let log = Self::append(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(log)
    }

    /// Query audit logs with filtering and pagination, newest first.
    pub async fn query(
        pool: &PgPool,
        params: &AuditQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_audit_filter(params);
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs {where_clause} \
             ORDER BY id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, AuditLog>(&query);
        for value in &bind_values {
            q = match value {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.clone()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count audit logs matching the given filter.
    pub async fn count(pool: &PgPool, params: &AuditQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_audit_filter(params);
        let query = format!("SELECT COUNT(*)::BIGINT FROM audit_logs {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for value in &bind_values {
            q = match value {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.clone()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.fetch_one(pool).await
    }

    /// Re-walk the whole chain and return the id of the first entry whose
    /// stored hash does not match, or `None` if the chain is intact.
    pub async fn verify_chain(pool: &PgPool) -> Result<Option<i64>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM audit_logs ORDER BY id ASC");
        let entries = sqlx::query_as::<_, AuditLog>(&query).fetch_all(pool).await?;

        let mut prev: Option<String> = None;
        for entry in entries {
            let data = canonical_entry_data(
                &entry.action,
                &entry.entity_type,
                &entry.entity_id.to_string(),
                &entry.actor,
                entry.new_values.as_ref(),
            );
            let expected = compute_integrity_hash(prev.as_deref(), &data);
            if expected != entry.integrity_hash {
                return Ok(Some(entry.id));
            }
            prev = Some(entry.integrity_hash);
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built audit log queries.
enum BindValue {
    BigInt(i64),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from `AuditQuery` filter parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
/// The `where_clause` is empty if no filters are active, or starts with `WHERE `.
fn build_audit_filter(params: &AuditQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(user_id) = params.user_id {
        conditions.push(format!("user_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(user_id));
    }

    if let Some(ref action) = params.action {
        conditions.push(format!("action = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(action.clone()));
    }

    if let Some(ref entity_type) = params.entity_type {
        conditions.push(format!("entity_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(entity_type.clone()));
    }

    if let Some(entity_id) = params.entity_id {
        conditions.push(format!("entity_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(entity_id));
    }

    if let Some(property_id) = params.property_id {
        conditions.push(format!("property_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(property_id));
    }

    if let Some(from) = params.from {
        conditions.push(format!("created_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.to {
        conditions.push(format!("created_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (clause, values, next) = build_audit_filter(&AuditQuery::default());
        assert!(clause.is_empty());
        assert!(values.is_empty());
        assert_eq!(next, 1);
    }

    #[test]
    fn filters_are_numbered_in_order() {
        let params = AuditQuery {
            action: Some("approve".into()),
            entity_type: Some("job_application".into()),
            property_id: Some(3),
            ..Default::default()
        };
        let (clause, values, next) = build_audit_filter(&params);
        assert_eq!(
            clause,
            "WHERE action = $1 AND entity_type = $2 AND property_id = $3"
        );
        assert_eq!(values.len(), 3);
        assert_eq!(next, 4);
    }
}
