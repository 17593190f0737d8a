//! Audit log constants and utility functions.
//!
//! Audit rows are append-only (a database trigger rejects UPDATE and DELETE)
//! and each row carries a SHA-256 hash chained to its predecessor.

use crate::hashing;

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for audit log entries.
pub mod actions {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const APPROVE: &str = "approve";
    pub const REJECT: &str = "reject";
    pub const TALENT_POOL: &str = "talent_pool";
    pub const ISSUE_TOKEN: &str = "issue_token";
    pub const REVOKE_TOKEN: &str = "revoke_token";
    pub const COMPLETE: &str = "complete";
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";

    pub const ALL: &[&str] = &[
        CREATE,
        UPDATE,
        APPROVE,
        REJECT,
        TALENT_POOL,
        ISSUE_TOKEN,
        REVOKE_TOKEN,
        COMPLETE,
        LOGIN,
        LOGOUT,
    ];
}

/// Entity types referenced by `audit_logs.entity_type`.
pub mod entities {
    pub const JOB_APPLICATION: &str = "job_application";
    pub const EMPLOYEE: &str = "employee";
    pub const ONBOARDING_SESSION: &str = "onboarding_session";
    pub const STEP_INVITATION: &str = "step_invitation";
    pub const PROPERTY: &str = "property";
    pub const USER: &str = "user";
}

// ---------------------------------------------------------------------------
// Integrity hash computation
// ---------------------------------------------------------------------------

/// Known seed value for the first entry in the hash chain.
const CHAIN_SEED: &str = "INNKEEP_AUDIT_CHAIN_SEED_V1";

/// Compute the SHA-256 integrity hash for an audit log entry.
///
/// `prev_hash` is the integrity_hash of the previous entry, or `None` for the
/// first entry in the chain.
pub fn compute_integrity_hash(prev_hash: Option<&str>, entry_data: &str) -> String {
    let prev = prev_hash.unwrap_or(CHAIN_SEED);
    let combined = format!("{prev}|{entry_data}");
    hashing::sha256_hex(combined.as_bytes())
}

/// Canonical string hashed for an entry. Values must already be redacted.
pub fn canonical_entry_data(
    action: &str,
    entity_type: &str,
    entity_id: &str,
    actor: &str,
    new_values: Option<&serde_json::Value>,
) -> String {
    let values = new_values.map(|v| v.to_string()).unwrap_or_default();
    format!("{action}|{entity_type}|{entity_id}|{actor}|{values}")
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Key fragments whose values never reach the audit table.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "authorization",
    "ssn",
    "account_number",
    "routing_number",
    "uscis_number",
];

const REDACTED: &str = "[REDACTED]";

/// Redact sensitive fields from a JSON value, recursing into objects and
/// arrays. Matching is a case-insensitive substring test on keys.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(key.clone(), serde_json::Value::String(REDACTED.into()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_entry_uses_seed() {
        let hash = compute_integrity_hash(None, "entry");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            hashing::sha256_hex(format!("{CHAIN_SEED}|entry").as_bytes())
        );
    }

    #[test]
    fn chained_entry_depends_on_previous_hash() {
        let first = compute_integrity_hash(None, "entry_1");
        let second = compute_integrity_hash(Some(&first), "entry_2");
        assert_ne!(first, second);
        assert_ne!(
            second,
            compute_integrity_hash(Some("tampered"), "entry_2"),
            "changing the predecessor must change the hash"
        );
    }

    #[test]
    fn canonical_data_includes_every_part() {
        let values = serde_json::json!({ "status": "approved" });
        let data = canonical_entry_data("approve", "job_application", "12", "user:3", Some(&values));
        assert_eq!(data, r#"approve|job_application|12|user:3|{"status":"approved"}"#);
        let data = canonical_entry_data("logout", "user", "3", "user:3", None);
        assert_eq!(data, "logout|user|3|user:3|");
    }

    #[test]
    fn redacts_paperwork_identifiers() {
        let input = serde_json::json!({
            "ssn": "123-45-6789",
            "routing_number": "021000021",
            "account_number": "000123456789",
            "bank_name": "Harbor Credit Union"
        });
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["ssn"], "[REDACTED]");
        assert_eq!(result["routing_number"], "[REDACTED]");
        assert_eq!(result["account_number"], "[REDACTED]");
        assert_eq!(result["bank_name"], "Harbor Credit Union");
    }

    #[test]
    fn redaction_recurses_and_ignores_case() {
        let input = serde_json::json!({
            "step_data": { "Password": "hunter2", "city": "Monterey" },
            "items": [{ "onboarding_token": "abc" }, { "title": "visible" }]
        });
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["step_data"]["Password"], "[REDACTED]");
        assert_eq!(result["step_data"]["city"], "Monterey");
        assert_eq!(result["items"][0]["onboarding_token"], "[REDACTED]");
        assert_eq!(result["items"][1]["title"], "visible");
    }

    #[test]
    fn scalars_pass_through() {
        let input = serde_json::json!("plain");
        assert_eq!(redact_sensitive_fields(&input), "plain");
    }

    #[test]
    fn action_list_is_complete() {
        assert_eq!(actions::ALL.len(), 10);
        assert!(actions::ALL.contains(&actions::TALENT_POOL));
    }
}
