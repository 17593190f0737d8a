//! Property (hotel location) model and DTOs.

use innkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `properties` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Property {
    pub id: DbId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public subset shown on the application form.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyInfo {
    pub id: DbId,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
}

impl From<Property> for PropertyInfo {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            name: p.name,
            city: p.city,
            state: p.state,
            phone: p.phone,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProperty {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(equal = 2))]
    pub state: String,
    #[validate(length(min = 5, max = 10))]
    pub zip_code: String,
    pub phone: Option<String>,
}

/// All fields optional; only provided fields are applied.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProperty {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(equal = 2))]
    pub state: Option<String>,
    #[validate(length(min = 5, max = 10))]
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}
