//! Staff role names.
//!
//! These must match the CHECK constraint on `users.role` in
//! `20260301000002_create_users.sql`. Employees never hold a staff role;
//! they authenticate with onboarding tokens only.

use crate::error::CoreError;

pub const ROLE_HR: &str = "hr";
pub const ROLE_MANAGER: &str = "manager";

/// All valid staff role names.
pub const VALID_ROLES: &[&str] = &[ROLE_HR, ROLE_MANAGER];

/// Parsed staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffRole {
    Hr,
    Manager,
}

impl StaffRole {
    pub fn as_str(self) -> &'static str {
        match self {
            StaffRole::Hr => ROLE_HR,
            StaffRole::Manager => ROLE_MANAGER,
        }
    }

    /// Parse a role name, rejecting anything outside [`VALID_ROLES`].
    pub fn parse(role: &str) -> Result<Self, CoreError> {
        match role {
            ROLE_HR => Ok(StaffRole::Hr),
            ROLE_MANAGER => Ok(StaffRole::Manager),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!(StaffRole::parse("hr").unwrap(), StaffRole::Hr);
        assert_eq!(StaffRole::parse("manager").unwrap(), StaffRole::Manager);
    }

    #[test]
    fn rejects_unknown_role() {
        let err = StaffRole::parse("employee").unwrap_err();
        assert!(err.to_string().contains("Invalid role 'employee'"));
    }

    #[test]
    fn round_trips_through_as_str() {
        for role in [StaffRole::Hr, StaffRole::Manager] {
            assert_eq!(StaffRole::parse(role.as_str()).unwrap(), role);
        }
    }
}
