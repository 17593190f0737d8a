//! JWT-based staff authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use innkeep_core::access::PropertyScope;
use innkeep_core::error::CoreError;
use innkeep_core::roles::StaffRole;
use innkeep_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated staff member extracted from a Bearer token in the
/// `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     user.scope().ensure_can_access(property_id)?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: StaffRole,
    /// Assigned property from the token claims.
    pub property_id: Option<DbId>,
}

impl AuthUser {
    pub fn scope(&self) -> PropertyScope {
        PropertyScope::new(self.role, self.property_id)
    }

    /// Label stored in `audit_logs.actor`.
    pub fn actor(&self) -> String {
        format!("user:{}", self.user_id)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let role = StaffRole::parse(&claims.role)
            .map_err(|_| AppError::Core(CoreError::Forbidden("Unknown staff role".into())))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role,
            property_id: claims.property_id,
        })
    }
}
