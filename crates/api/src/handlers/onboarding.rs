//! Employee-facing onboarding endpoints.
//!
//! Authenticated by the onboarding token, never by a staff login. Reads are
//! allowed on completed sessions; every write requires an open session.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use innkeep_core::audit::{actions, entities};
use innkeep_core::error::CoreError;
use innkeep_core::forms::validate_step_data;
use innkeep_core::onboarding::{
    build_progress, ensure_session_mutable, ensure_step_allowed, lock_is_stale, missing_steps,
    OnboardingStep, SessionMode, SessionProgress, SessionStatus,
};
use innkeep_core::types::{Date, DbId};
use innkeep_db::models::audit::CreateAuditLog;
use innkeep_db::models::employee::Employee;
use innkeep_db::models::onboarding_session::OnboardingSessionSummary;
use innkeep_db::models::property::PropertyInfo;
use innkeep_db::models::session_lock::SessionLock;
use innkeep_db::repositories::{
    AuditLogRepo, EmployeeRepo, OnboardingSessionRepo, PropertyRepo, SessionLockRepo,
};
use innkeep_events::notices::CompletionNotice;
use innkeep_events::{event_types, DomainEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::notice;
use crate::error::{AppError, AppResult};
use crate::middleware::onboarding::{
    authorize_onboarding_token, OnboardingContext, OnboardingSessionAuth,
};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SaveStepRequest {
    pub data: serde_json::Value,
    /// Required while another lock on the session is live.
    pub lock_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LockRequest {
    /// Label for the browser or device editing the session.
    #[validate(length(min = 1, max = 100))]
    pub holder: String,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseLockParams {
    pub lock_token: String,
}

/// The new hire as shown on the welcome page.
#[derive(Debug, Serialize)]
pub struct EmployeeSummary {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub job_title: String,
    pub supervisor: String,
    pub start_date: Date,
    pub i9_section1_deadline: Date,
}

impl From<&Employee> for EmployeeSummary {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id,
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            department: e.department.clone(),
            job_title: e.job_title.clone(),
            supervisor: e.supervisor.clone(),
            start_date: e.start_date,
            i9_section1_deadline: e.i9_section1_deadline,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session: OnboardingSessionSummary,
    pub employee: Option<EmployeeSummary>,
    pub property: Option<PropertyInfo>,
    pub progress: SessionProgress,
    /// Previously saved form data keyed by step, for resuming.
    pub saved_data: serde_json::Value,
}

fn progress_of(ctx: &OnboardingContext) -> SessionProgress {
    build_progress(ctx.mode, ctx.target_step, &ctx.session.completed_steps)
}

async fn session_view(state: &AppState, ctx: &OnboardingContext) -> AppResult<SessionView> {
    let property = PropertyRepo::find_by_id(&state.pool, ctx.session.property_id)
        .await?
        .map(PropertyInfo::from);

    Ok(SessionView {
        session: OnboardingSessionSummary::from(&ctx.session),
        employee: ctx.employee.as_ref().map(EmployeeSummary::from),
        property,
        progress: progress_of(ctx),
        saved_data: ctx.session.step_data.clone(),
    })
}

fn session_closed() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Onboarding session is no longer open".into(),
    ))
}

fn ensure_open(ctx: &OnboardingContext) -> Result<(), CoreError> {
    ensure_session_mutable(ctx.status, ctx.session.expires_at, Utc::now())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/onboarding/welcome/{token}
///
/// Landing page for the emailed link. The first visit moves the session to
/// `in_progress`.
pub async fn welcome(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let mut ctx = authorize_onboarding_token(&state, &token).await?;

    if ctx.status == SessionStatus::NotStarted {
        let started = OnboardingSessionRepo::mark_started(&state.pool, ctx.session.id).await?;
        if let Some(session) = started {
            ctx.status = SessionStatus::InProgress;
            ctx.session = session;
        }
        if let Some(employee) = &ctx.employee {
            EmployeeRepo::mark_onboarding_started(&state.pool, employee.id).await?;
        }
        tracing::info!(
            session_id = ctx.session.id,
            employee_id = ?ctx.session.employee_id,
            "Onboarding started"
        );
    }

    Ok(Json(DataResponse {
        data: session_view(&state, &ctx).await?,
    }))
}

/// GET /api/v1/onboarding/session
pub async fn get_session(
    OnboardingSessionAuth(ctx): OnboardingSessionAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    Ok(Json(DataResponse {
        data: session_view(&state, &ctx).await?,
    }))
}

/// PUT /api/v1/onboarding/session/steps/{step}
///
/// Validates the step's form and stores it. Saving a step twice replaces the
/// earlier data.
pub async fn save_step(
    OnboardingSessionAuth(ctx): OnboardingSessionAuth,
    State(state): State<AppState>,
    Path(step): Path<String>,
    Json(input): Json<SaveStepRequest>,
) -> AppResult<Json<DataResponse<SessionProgress>>> {
    let step = OnboardingStep::parse(&step)?;
    ensure_open(&ctx)?;
    ensure_step_allowed(ctx.mode, ctx.target_step, step)?;

    let now = Utc::now();
    validate_step_data(step, &input.data, now.date_naive())?;

    if let Some(lock) = SessionLockRepo::find(&state.pool, ctx.session.id).await? {
        let held_by_caller = input.lock_token.as_deref() == Some(lock.lock_token.as_str());
        if !lock_is_stale(lock.expires_at, now) && !held_by_caller {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Session is being edited by '{}'",
                lock.holder
            ))));
        }
    }

    let session = OnboardingSessionRepo::save_step(
        &state.pool,
        ctx.session.id,
        step.as_str(),
        &input.data,
    )
    .await?
    .ok_or_else(session_closed)?;

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(
            ctx.actor(),
            actions::UPDATE,
            entities::ONBOARDING_SESSION,
            session.id,
        )
        .in_property(session.property_id)
        .with_new(json!({ "step": step, "data": input.data })),
    )
    .await?;

    tracing::debug!(session_id = session.id, step = %step, "Onboarding step saved");

    Ok(Json(DataResponse {
        data: build_progress(ctx.mode, ctx.target_step, &session.completed_steps),
    }))
}

/// POST /api/v1/onboarding/session/lock
///
/// Takes the edit lock, or refreshes it for the same holder. A lock past its
/// expiry is taken over.
pub async fn acquire_lock(
    OnboardingSessionAuth(ctx): OnboardingSessionAuth,
    State(state): State<AppState>,
    Json(input): Json<LockRequest>,
) -> AppResult<Json<DataResponse<SessionLock>>> {
    input.validate()?;
    ensure_open(&ctx)?;

    let expires_at = Utc::now() + Duration::minutes(state.config.onboarding.lock_minutes);
    let lock = SessionLockRepo::acquire(
        &state.pool,
        ctx.session.id,
        &Uuid::new_v4().to_string(),
        &input.holder,
        expires_at,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Session is locked by another holder".into(),
        ))
    })?;

    tracing::debug!(session_id = ctx.session.id, holder = %lock.holder, "Session lock acquired");

    Ok(Json(DataResponse { data: lock }))
}

/// DELETE /api/v1/onboarding/session/lock?lock_token=
pub async fn release_lock(
    OnboardingSessionAuth(ctx): OnboardingSessionAuth,
    State(state): State<AppState>,
    Query(params): Query<ReleaseLockParams>,
) -> AppResult<StatusCode> {
    let released = SessionLockRepo::release(&state.pool, ctx.session.id, &params.lock_token).await?;
    if !released {
        return Err(AppError::Core(CoreError::Conflict(
            "Lock is not held with this token".into(),
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/onboarding/session/complete
///
/// Closes the session once every required step is saved. Afterwards the
/// token still reads the session but can no longer change it.
pub async fn complete(
    OnboardingSessionAuth(ctx): OnboardingSessionAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<OnboardingSessionSummary>>> {
    ensure_open(&ctx)?;

    let missing = missing_steps(ctx.mode, ctx.target_step, &ctx.session.completed_steps);
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
        return Err(AppError::Core(CoreError::Validation(format!(
            "Onboarding is missing required steps: {}",
            names.join(", ")
        ))));
    }

    let mut tx = state.pool.begin().await?;

    let session = OnboardingSessionRepo::complete(&mut tx, ctx.session.id)
        .await?
        .ok_or_else(session_closed)?;

    let employee = match (ctx.mode, ctx.employee.as_ref()) {
        (SessionMode::Full, Some(employee)) => {
            EmployeeRepo::mark_onboarding_completed(&mut tx, employee.id).await?
        }
        _ => None,
    };

    SessionLockRepo::clear(&mut tx, session.id).await?;

    AuditLogRepo::append(
        &mut tx,
        &CreateAuditLog::new(
            ctx.actor(),
            actions::COMPLETE,
            entities::ONBOARDING_SESSION,
            session.id,
        )
        .in_property(session.property_id)
        .with_new(json!({
            "employee_id": session.employee_id,
            "mode": session.mode,
            "completed_steps": session.completed_steps,
        })),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        session_id = session.id,
        employee_id = ?session.employee_id,
        mode = %session.mode,
        "Onboarding session completed"
    );

    if let Some(employee) = employee {
        let manager_email = notice::manager_email(&state.pool, session.manager_id).await;
        let property_name = notice::property_name(&state.pool, employee.property_id).await;

        state.event_bus.publish(
            DomainEvent::new(event_types::ONBOARDING_COMPLETED)
                .with_source(entities::EMPLOYEE, employee.id)
                .in_property(employee.property_id)
                .with_notice(&CompletionNotice {
                    manager_email,
                    employee_name: employee.full_name(),
                    property_name,
                    job_title: employee.job_title.clone(),
                    start_date: Some(employee.start_date),
                }),
        );
    }

    Ok(Json(DataResponse {
        data: OnboardingSessionSummary::from(&session),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_request_lock_token_is_optional() {
        let input: SaveStepRequest =
            serde_json::from_str(r#"{"data": {"acknowledged": true}}"#).unwrap();
        assert!(input.lock_token.is_none());
        assert_eq!(input.data["acknowledged"], true);
    }

    #[test]
    fn lock_holder_must_be_named() {
        let input = LockRequest {
            holder: String::new(),
        };
        assert!(input.validate().is_err());
    }
}
