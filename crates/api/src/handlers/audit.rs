//! HR-only audit log queries.

use axum::extract::{Query, State};
use axum::Json;
use innkeep_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use innkeep_core::types::DbId;
use innkeep_db::models::audit::{AuditLog, AuditQuery};
use innkeep_db::repositories::AuditLogRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireHr;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChainStatus {
    pub intact: bool,
    /// First entry whose hash does not match its predecessor.
    pub first_broken_id: Option<DbId>,
}

/// GET /api/v1/audit-logs
pub async fn list_audit_logs(
    RequireHr(_user): RequireHr,
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<DataResponse<Page<AuditLog>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let items = AuditLogRepo::query(&state.pool, &params, limit, offset).await?;
    let total = AuditLogRepo::count(&state.pool, &params).await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/audit-logs/verify
///
/// Walks the whole hash chain.
pub async fn verify_audit_chain(
    RequireHr(user): RequireHr,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ChainStatus>>> {
    let first_broken_id = AuditLogRepo::verify_chain(&state.pool).await?;
    match first_broken_id {
        Some(id) => tracing::error!(entry_id = id, user_id = user.user_id, "Audit chain broken"),
        None => tracing::info!(user_id = user.user_id, "Audit chain verified"),
    }
    Ok(Json(DataResponse {
        data: ChainStatus {
            intact: first_broken_id.is_none(),
            first_broken_id,
        },
    }))
}
