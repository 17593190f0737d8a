//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement with 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use innkeep_core::error::CoreError;
use innkeep_core::roles::StaffRole;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `hr` role.
///
/// ```ignore
/// async fn hr_only(RequireHr(user): RequireHr) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireHr(pub AuthUser);

impl FromRequestParts<AppState> for RequireHr {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != StaffRole::Hr {
            return Err(AppError::Core(CoreError::Forbidden(
                "HR role required".into(),
            )));
        }
        Ok(RequireHr(user))
    }
}
