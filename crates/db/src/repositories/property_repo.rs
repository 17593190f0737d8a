//! Repository for the `properties` table.

use innkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::property::{CreateProperty, Property, UpdateProperty};

const COLUMNS: &str = "id, name, address, city, state, zip_code, phone, is_active, \
                       created_at, updated_at";

pub struct PropertyRepo;

impl PropertyRepo {
    pub async fn create(pool: &PgPool, input: &CreateProperty) -> Result<Property, sqlx::Error> {
        let query = format!(
            "INSERT INTO properties (name, address, city, state, zip_code, phone)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.zip_code)
            .bind(&input.phone)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Property>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM properties WHERE id = $1");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a property only if it is accepting applications.
    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<Property>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM properties WHERE id = $1 AND is_active = true");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Property>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM properties
             WHERE ($1 OR is_active = true)
             ORDER BY name"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a property. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProperty,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!(
            "UPDATE properties SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                zip_code = COALESCE($6, zip_code),
                phone = COALESCE($7, phone),
                is_active = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.zip_code)
            .bind(&input.phone)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }
}
