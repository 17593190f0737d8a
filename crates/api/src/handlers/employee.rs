//! Handlers for employees created by the approval workflow.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use innkeep_core::audit::{actions, entities};
use innkeep_core::error::CoreError;
use innkeep_core::i9::{deadline_status, DeadlineStatus};
use innkeep_core::onboarding::{employee_status, SessionMode};
use innkeep_core::types::{Date, DbId};
use innkeep_db::models::audit::CreateAuditLog;
use innkeep_db::models::employee::Employee;
use innkeep_db::models::onboarding_session::OnboardingSessionSummary;
use innkeep_db::repositories::{AuditLogRepo, EmployeeRepo, OnboardingSessionRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, Page};
use crate::sessions::{full_onboarding_expiry, issue_session, SessionRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmployeeListParams {
    pub property_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PropertyFilterParams {
    pub property_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct EmployeeDetail {
    #[serde(flatten)]
    pub employee: Employee,
    pub i9_section2_status: DeadlineStatus,
    pub sessions: Vec<OnboardingSessionSummary>,
}

/// One row of the I-9 Section 2 worklist.
#[derive(Debug, Serialize)]
pub struct I9DeadlineEntry {
    pub employee_id: DbId,
    pub employee_name: String,
    pub property_id: DbId,
    pub start_date: Date,
    pub section1_deadline: Date,
    pub section2_deadline: Date,
    pub status: DeadlineStatus,
}

impl I9DeadlineEntry {
    fn from_employee(employee: &Employee, today: Date) -> Self {
        Self {
            employee_id: employee.id,
            employee_name: employee.full_name(),
            property_id: employee.property_id,
            start_date: employee.start_date,
            section1_deadline: employee.i9_section1_deadline,
            section2_deadline: employee.i9_section2_deadline,
            status: section2_status(employee, today),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReissueResponse {
    pub revoked_session_ids: Vec<DbId>,
    pub session: OnboardingSessionSummary,
    pub onboarding_token: String,
    pub onboarding_url: String,
}

fn section2_status(employee: &Employee, today: Date) -> DeadlineStatus {
    deadline_status(
        employee.i9_section2_deadline,
        today,
        employee.i9_section2_completed_at.is_some(),
    )
}

/// Load an employee and check the caller's property scope.
async fn find_scoped(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Employee> {
    let employee = EmployeeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id,
        }))?;
    user.scope().ensure_can_access(employee.property_id)?;
    Ok(employee)
}

/// GET /api/v1/employees
pub async fn list_employees(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<EmployeeListParams>,
) -> AppResult<Json<DataResponse<Page<Employee>>>> {
    let property_id = user.scope().list_filter(params.property_id)?;
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();

    let items = EmployeeRepo::list(&state.pool, property_id, limit, offset).await?;
    let total = EmployeeRepo::count(&state.pool, property_id).await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/employees/{id}
pub async fn get_employee(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EmployeeDetail>>> {
    let employee = find_scoped(&state, &user, id).await?;
    let sessions = OnboardingSessionRepo::list_for_employee(&state.pool, id)
        .await?
        .iter()
        .map(OnboardingSessionSummary::from)
        .collect();

    Ok(Json(DataResponse {
        data: EmployeeDetail {
            i9_section2_status: section2_status(&employee, Utc::now().date_naive()),
            employee,
            sessions,
        },
    }))
}

/// GET /api/v1/employees/i9-deadlines
///
/// Employees with Section 2 outstanding, soonest deadline first.
pub async fn list_i9_deadlines(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PropertyFilterParams>,
) -> AppResult<Json<DataResponse<Vec<I9DeadlineEntry>>>> {
    let property_id = user.scope().list_filter(params.property_id)?;
    let today = Utc::now().date_naive();

    let entries = EmployeeRepo::list_i9_pending(&state.pool, property_id)
        .await?
        .iter()
        .map(|e| I9DeadlineEntry::from_employee(e, today))
        .collect();

    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/employees/{id}/i9-section2
pub async fn complete_i9_section2(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Employee>>> {
    let employee = find_scoped(&state, &user, id).await?;
    let today = Utc::now().date_naive();
    let status_before = section2_status(&employee, today);

    let updated = EmployeeRepo::complete_i9_section2(&state.pool, id, user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "I-9 Section 2 is already recorded for this employee".into(),
            ))
        })?;

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(user.actor(), actions::UPDATE, entities::EMPLOYEE, id)
            .by_user(user.user_id)
            .in_property(updated.property_id)
            .with_old(json!({ "i9_section2_completed_at": null }))
            .with_new(json!({
                "i9_section2_completed_at": updated.i9_section2_completed_at,
                "i9_section2_completed_by": updated.i9_section2_completed_by,
            })),
    )
    .await?;

    if status_before == DeadlineStatus::Overdue {
        tracing::warn!(
            employee_id = id,
            deadline = %updated.i9_section2_deadline,
            "I-9 Section 2 recorded after its deadline"
        );
    } else {
        tracing::info!(employee_id = id, "I-9 Section 2 recorded");
    }

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/employees/{id}/onboarding-token
///
/// Revokes every open full onboarding session for the employee and issues a
/// fresh one. The previous links stop working immediately.
pub async fn reissue_onboarding_token(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<ReissueResponse>>)> {
    let employee = find_scoped(&state, &user, id).await?;
    if employee.onboarding_status == employee_status::EMPLOYEE_COMPLETED {
        return Err(AppError::Core(CoreError::Conflict(
            "Employee has already completed onboarding".into(),
        )));
    }

    let mut tx = state.pool.begin().await?;

    let revoked = OnboardingSessionRepo::revoke_open_for_employee(&mut tx, id).await?;
    for session_id in &revoked {
        AuditLogRepo::append(
            &mut tx,
            &CreateAuditLog::new(
                user.actor(),
                actions::REVOKE_TOKEN,
                entities::ONBOARDING_SESSION,
                *session_id,
            )
            .by_user(user.user_id)
            .in_property(employee.property_id)
            .with_new(json!({ "employee_id": id, "reason": "reissued" })),
        )
        .await?;
    }

    let issued = issue_session(
        &mut tx,
        &state.config.jwt.secret,
        &SessionRequest {
            employee_id: Some(employee.id),
            property_id: employee.property_id,
            manager_id: employee.manager_id,
            created_by: user.user_id,
            email: &employee.email,
            mode: SessionMode::Full,
            target_step: None,
            expires_at: full_onboarding_expiry(&state.config.onboarding, Utc::now()),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        employee_id = id,
        revoked = revoked.len(),
        issued_by = user.user_id,
        "Onboarding token re-issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ReissueResponse {
                revoked_session_ids: revoked,
                session: OnboardingSessionSummary::from(&issued.session),
                onboarding_url: state.config.onboarding.onboarding_url(&issued.token),
                onboarding_token: issued.token,
            },
        }),
    ))
}
