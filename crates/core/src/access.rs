//! Property isolation rules.
//!
//! A property (hotel) is the tenant boundary. HR staff see every property;
//! a manager sees only the single property they are assigned to. A manager
//! without an assignment sees nothing.

use crate::error::CoreError;
use crate::roles::StaffRole;
use crate::types::DbId;

/// The property reach of an authenticated staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyScope {
    pub role: StaffRole,
    pub property_id: Option<DbId>,
}

impl PropertyScope {
    pub fn new(role: StaffRole, property_id: Option<DbId>) -> Self {
        Self { role, property_id }
    }

    pub fn is_hr(&self) -> bool {
        self.role == StaffRole::Hr
    }

    /// Reject access to a row owned by `property_id` unless the actor may
    /// see that property.
    pub fn ensure_can_access(&self, property_id: DbId) -> Result<(), CoreError> {
        match self.role {
            StaffRole::Hr => Ok(()),
            StaffRole::Manager => match self.property_id {
                Some(assigned) if assigned == property_id => Ok(()),
                Some(_) => Err(CoreError::Forbidden(
                    "Access denied: resource belongs to a different property".into(),
                )),
                None => Err(CoreError::Forbidden(
                    "Manager is not assigned to a property".into(),
                )),
            },
        }
    }

    /// Resolve the property filter for a list query.
    ///
    /// HR may pass any filter (or none, meaning all properties). A manager is
    /// always pinned to their own property; asking for another one is an
    /// error rather than a silently empty list.
    pub fn list_filter(&self, requested: Option<DbId>) -> Result<Option<DbId>, CoreError> {
        match self.role {
            StaffRole::Hr => Ok(requested),
            StaffRole::Manager => {
                let assigned = self.property_id.ok_or_else(|| {
                    CoreError::Forbidden("Manager is not assigned to a property".into())
                })?;
                match requested {
                    Some(p) if p != assigned => Err(CoreError::Forbidden(
                        "Access denied: resource belongs to a different property".into(),
                    )),
                    _ => Ok(Some(assigned)),
                }
            }
        }
    }
}
