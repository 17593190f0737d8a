//! Handlers for HR staff administration (`/admin/users`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use innkeep_core::audit::{actions, entities};
use innkeep_core::error::CoreError;
use innkeep_core::roles::StaffRole;
use innkeep_core::types::DbId;
use innkeep_db::models::audit::CreateAuditLog;
use innkeep_db::models::user::{CreateUser, UpdateUser, UserResponse};
use innkeep_db::repositories::{AuditLogRepo, PropertyRepo, UserRepo};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireHr;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub property_id: Option<DbId>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub role: String,
    pub property_id: Option<DbId>,
}

/// Partial update. `property_id: null` clears the assignment; omitting the
/// field leaves it unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub property_id: Option<Option<DbId>>,
    pub is_active: Option<bool>,
}

/// Distinguish an explicit `null` from a missing field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

/// A manager must be assigned to an existing property.
async fn check_assignment(
    state: &AppState,
    role: StaffRole,
    property_id: Option<DbId>,
) -> AppResult<()> {
    match (role, property_id) {
        (StaffRole::Manager, None) => Err(AppError::Core(CoreError::Validation(
            "Managers must be assigned to a property".into(),
        ))),
        (_, Some(id)) => {
            PropertyRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Property",
                    id,
                }))?;
            Ok(())
        }
        (StaffRole::Hr, None) => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireHr(_user): RequireHr,
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool, params.property_id).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    RequireHr(admin): RequireHr,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;
    let role = StaffRole::parse(&input.role)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    check_assignment(&state, role, input.property_id).await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email.trim().to_lowercase(),
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            role: role.as_str().to_string(),
            property_id: input.property_id,
        },
    )
    .await?;

    let mut entry = CreateAuditLog::new(admin.actor(), actions::CREATE, entities::USER, user.id)
        .by_user(admin.user_id)
        .with_new(json!({
            "email": user.email,
            "role": user.role,
            "property_id": user.property_id,
        }));
    if let Some(property_id) = user.property_id {
        entry = entry.in_property(property_id);
    }
    AuditLogRepo::record(&state.pool, &entry).await?;

    tracing::info!(user_id = user.id, role = %user.role, "Staff user created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    RequireHr(admin): RequireHr,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    let before = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    let role = match &input.role {
        Some(role) => StaffRole::parse(role)?,
        None => StaffRole::parse(&before.role)?,
    };
    let property_id = input.property_id.unwrap_or(before.property_id);
    check_assignment(&state, role, property_id).await?;

    let user = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role.map(|_| role.as_str().to_string()),
            property_id: input.property_id,
            is_active: input.is_active,
        },
    )
    .await?
    .ok_or_else(|| user_not_found(id))?;

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(admin.actor(), actions::UPDATE, entities::USER, id)
            .by_user(admin.user_id)
            .with_old(json!({
                "role": before.role,
                "property_id": before.property_id,
                "is_active": before.is_active,
            }))
            .with_new(json!({
                "role": user.role,
                "property_id": user.property_id,
                "is_active": user.is_active,
            })),
    )
    .await?;

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}
