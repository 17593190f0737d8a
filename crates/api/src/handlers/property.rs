//! Handlers for the `/properties` resource.
//!
//! Property administration is HR-only. Managers may read their own
//! property, and the public application form reads the minimal
//! [`PropertyInfo`] of active properties.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use innkeep_core::audit::{actions, entities};
use innkeep_core::error::CoreError;
use innkeep_core::types::DbId;
use innkeep_db::models::audit::CreateAuditLog;
use innkeep_db::models::property::{CreateProperty, Property, PropertyInfo, UpdateProperty};
use innkeep_db::repositories::{AuditLogRepo, PropertyRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireHr;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Property",
        id,
    })
}

/// GET /api/v1/properties
pub async fn list_properties(
    RequireHr(_user): RequireHr,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Property>>>> {
    let properties = PropertyRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: properties }))
}

/// GET /api/v1/properties/{id}
pub async fn get_property(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Property>>> {
    user.scope().ensure_can_access(id)?;
    let property = PropertyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: property }))
}

/// POST /api/v1/properties
pub async fn create_property(
    RequireHr(user): RequireHr,
    State(state): State<AppState>,
    Json(input): Json<CreateProperty>,
) -> AppResult<(StatusCode, Json<DataResponse<Property>>)> {
    input.validate()?;

    let property = PropertyRepo::create(&state.pool, &input).await?;

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(user.actor(), actions::CREATE, entities::PROPERTY, property.id)
            .by_user(user.user_id)
            .in_property(property.id)
            .with_new(serde_json::to_value(&property).unwrap_or_default()),
    )
    .await?;

    tracing::info!(property_id = property.id, name = %property.name, "Property created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: property })))
}

/// PUT /api/v1/properties/{id}
pub async fn update_property(
    RequireHr(user): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProperty>,
) -> AppResult<Json<DataResponse<Property>>> {
    input.validate()?;

    let before = PropertyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let property = PropertyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(user.actor(), actions::UPDATE, entities::PROPERTY, id)
            .by_user(user.user_id)
            .in_property(id)
            .with_old(serde_json::to_value(&before).unwrap_or_default())
            .with_new(serde_json::to_value(&property).unwrap_or_default()),
    )
    .await?;

    Ok(Json(DataResponse { data: property }))
}

/// GET /api/v1/properties/{id}/info
///
/// Public. Only active properties are visible.
pub async fn property_info(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PropertyInfo>>> {
    let property = PropertyRepo::find_active(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: PropertyInfo::from(property),
    }))
}
