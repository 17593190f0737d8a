//! Handlers for job applications: public intake and the review workflow.
//!
//! Approval and rejection run in one transaction each. The status change is
//! a conditional `UPDATE ... WHERE status = 'pending'`, so concurrent
//! reviewers cannot both succeed. Emails go out through the event bus only
//! after commit.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use innkeep_core::application::{
    ensure_reviewable, rejection_status, validate_employment_type, validate_pay_frequency,
    validate_pay_rate, validate_rejection_reason, ApplicationStatus, EMPLOYMENT_FULL_TIME,
};
use innkeep_core::audit::{actions, entities};
use innkeep_core::error::CoreError;
use innkeep_core::forms::{reject_nul, reject_nul_str};
use innkeep_core::i9::{deadlines_for, I9Deadlines};
use innkeep_core::onboarding::SessionMode;
use innkeep_core::roles::StaffRole;
use innkeep_core::types::{Date, DbId};
use innkeep_db::models::audit::CreateAuditLog;
use innkeep_db::models::employee::{CreateEmployee, Employee};
use innkeep_db::models::job_application::{
    ApplicationFilter, CreateJobApplication, JobApplication,
};
use innkeep_db::models::onboarding_session::OnboardingSessionSummary;
use innkeep_db::repositories::{
    AuditLogRepo, EmployeeRepo, JobApplicationRepo, PropertyRepo, UserRepo,
};
use innkeep_events::notices::{ApplicationReceived, OfferNotice, RejectionNotice};
use innkeep_events::{event_types, DomainEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::notice;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, Page};
use crate::sessions::{full_onboarding_expiry, issue_session, SessionRequest};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ApplicationListParams {
    pub property_id: Option<DbId>,
    pub status: Option<String>,
    pub department: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Job offer submitted with an approval.
#[derive(Debug, Deserialize, Validate)]
pub struct ApproveRequest {
    #[validate(length(min = 1, max = 100))]
    pub job_title: String,
    pub pay_rate: f64,
    pub pay_frequency: String,
    pub start_date: Date,
    #[validate(length(min = 1, max = 200))]
    pub supervisor: String,
    pub employment_type: Option<String>,
    /// Manager responsible for the new hire. Defaults to the approving
    /// manager.
    pub manager_id: Option<DbId>,
}

impl ApproveRequest {
    fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        validate_pay_frequency(&self.pay_frequency)?;
        validate_pay_rate(self.pay_rate, &self.pay_frequency)?;
        if let Some(employment_type) = &self.employment_type {
            validate_employment_type(employment_type)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
    #[serde(default)]
    pub add_to_talent_pool: bool,
    #[serde(default = "default_true")]
    pub notify_applicant: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub application: JobApplication,
    pub employee: Employee,
    pub i9_deadlines: I9Deadlines,
    pub session: OnboardingSessionSummary,
    pub onboarding_token: String,
    pub onboarding_url: String,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "JobApplication",
        id,
    })
}

fn reject_nul_in_application(input: &CreateJobApplication) -> Result<(), CoreError> {
    [
        &input.first_name,
        &input.last_name,
        &input.email,
        &input.department,
        &input.position,
    ]
    .into_iter()
    .chain(input.phone.as_ref())
    .try_for_each(|field| reject_nul_str(field))?;
    input.applicant_data.as_ref().map_or(Ok(()), reject_nul)
}

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

/// POST /api/v1/apply/{property_id}
///
/// Public. A second pending application for the same email and position at
/// the same property is rejected with 409.
pub async fn submit_application(
    State(state): State<AppState>,
    Path(property_id): Path<DbId>,
    Json(input): Json<CreateJobApplication>,
) -> AppResult<(StatusCode, Json<DataResponse<JobApplication>>)> {
    input.validate()?;
    reject_nul_in_application(&input)?;

    let property = PropertyRepo::find_active(&state.pool, property_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Property",
            id: property_id,
        }))?;

    let application = JobApplicationRepo::create(&state.pool, property_id, &input).await?;

    AuditLogRepo::record(
        &state.pool,
        &CreateAuditLog::new(
            "applicant",
            actions::CREATE,
            entities::JOB_APPLICATION,
            application.id,
        )
        .in_property(property_id)
        .with_new(json!({
            "email": application.email,
            "department": application.department,
            "position": application.position,
        })),
    )
    .await?;

    tracing::info!(
        application_id = application.id,
        property_id,
        position = %application.position,
        "Job application received"
    );

    state.event_bus.publish(
        DomainEvent::new(event_types::APPLICATION_SUBMITTED)
            .with_source(entities::JOB_APPLICATION, application.id)
            .in_property(property_id)
            .with_notice(&ApplicationReceived {
                applicant_email: application.email.clone(),
                applicant_name: application.full_name(),
                property_name: property.name,
                position: application.position.clone(),
            }),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: application })))
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/v1/applications
///
/// Managers only ever see their own property.
pub async fn list_applications(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ApplicationListParams>,
) -> AppResult<Json<DataResponse<Page<JobApplication>>>> {
    let property_id = user.scope().list_filter(params.property_id)?;
    let status = params
        .status
        .as_deref()
        .map(ApplicationStatus::parse)
        .transpose()?;
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();

    let filter = ApplicationFilter {
        property_id,
        status: status.map(|s| s.as_str().to_string()),
        department: params.department,
        limit,
        offset,
    };

    let items = JobApplicationRepo::list(&state.pool, &filter).await?;
    let total = JobApplicationRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/applications/{id}
pub async fn get_application(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<JobApplication>>> {
    let application = JobApplicationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    user.scope().ensure_can_access(application.property_id)?;
    Ok(Json(DataResponse { data: application }))
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// Resolve the manager recorded on the new employee.
async fn resolve_manager(
    state: &AppState,
    user: &AuthUser,
    requested: Option<DbId>,
    property_id: DbId,
) -> AppResult<Option<DbId>> {
    let Some(manager_id) = requested else {
        return Ok((user.role == StaffRole::Manager).then_some(user.user_id));
    };

    let manager = UserRepo::find_by_id(&state.pool, manager_id)
        .await?
        .filter(|m| m.is_active && m.role == StaffRole::Manager.as_str())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "manager_id {manager_id} is not an active manager"
            )))
        })?;
    if manager.property_id != Some(property_id) {
        return Err(AppError::Core(CoreError::Validation(
            "The assigned manager belongs to a different property".into(),
        )));
    }
    Ok(Some(manager.id))
}

/// POST /api/v1/applications/{id}/approve
///
/// In one transaction: mark the application approved, create the employee
/// with its I-9 deadlines, issue the onboarding session, and write the audit
/// trail. The offer email is published after commit.
pub async fn approve_application(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ApproveRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ApprovalResponse>>)> {
    input.check()?;

    let mut tx = state.pool.begin().await?;

    let application = JobApplicationRepo::find_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    user.scope().ensure_can_access(application.property_id)?;
    ensure_reviewable(ApplicationStatus::parse(&application.status)?)?;

    let manager_id = resolve_manager(&state, &user, input.manager_id, application.property_id)
        .await?;

    let application = JobApplicationRepo::mark_approved(&mut tx, id, user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Application has already been reviewed".into(),
            ))
        })?;

    let deadlines = deadlines_for(input.start_date);
    let employee = EmployeeRepo::create(
        &mut tx,
        &CreateEmployee {
            application_id: application.id,
            property_id: application.property_id,
            manager_id,
            first_name: application.first_name.clone(),
            last_name: application.last_name.clone(),
            email: application.email.clone(),
            phone: application.phone.clone(),
            department: application.department.clone(),
            job_title: input.job_title.clone(),
            pay_rate: input.pay_rate,
            pay_frequency: input.pay_frequency.clone(),
            employment_type: input
                .employment_type
                .clone()
                .unwrap_or_else(|| EMPLOYMENT_FULL_TIME.to_string()),
            start_date: input.start_date,
            supervisor: input.supervisor.clone(),
            i9_section1_deadline: deadlines.section1,
            i9_section2_deadline: deadlines.section2,
        },
    )
    .await?;

    AuditLogRepo::append(
        &mut tx,
        &CreateAuditLog::new(
            user.actor(),
            actions::APPROVE,
            entities::JOB_APPLICATION,
            application.id,
        )
        .by_user(user.user_id)
        .in_property(application.property_id)
        .with_old(json!({ "status": ApplicationStatus::Pending }))
        .with_new(json!({
            "status": ApplicationStatus::Approved,
            "employee_id": employee.id,
        })),
    )
    .await?;

    AuditLogRepo::append(
        &mut tx,
        &CreateAuditLog::new(user.actor(), actions::CREATE, entities::EMPLOYEE, employee.id)
            .by_user(user.user_id)
            .in_property(employee.property_id)
            .with_new(json!({
                "application_id": employee.application_id,
                "job_title": employee.job_title,
                "pay_rate": employee.pay_rate,
                "pay_frequency": employee.pay_frequency,
                "start_date": employee.start_date,
                "manager_id": employee.manager_id,
            })),
    )
    .await?;

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
        application_id = application.id,
        employee_id = employee.id,
        approved_by = user.user_id,
        "Application approved"
    );

    let onboarding_url = state.config.onboarding.onboarding_url(&issued.token);

    state.event_bus.publish(
        DomainEvent::new(event_types::APPLICATION_APPROVED)
            .with_source(entities::JOB_APPLICATION, application.id)
            .with_actor(user.user_id)
            .in_property(application.property_id)
            .with_notice(&OfferNotice {
                employee_email: employee.email.clone(),
                employee_name: employee.full_name(),
                property_name: notice::property_name(&state.pool, employee.property_id).await,
                job_title: employee.job_title.clone(),
                start_date: employee.start_date,
                pay_rate: employee.pay_rate,
                pay_frequency: employee.pay_frequency.clone(),
                supervisor: employee.supervisor.clone(),
                onboarding_url: onboarding_url.clone(),
                expires_at: issued.session.expires_at,
            }),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ApprovalResponse {
                application,
                employee,
                i9_deadlines: deadlines,
                session: OnboardingSessionSummary::from(&issued.session),
                onboarding_token: issued.token,
                onboarding_url,
            },
        }),
    ))
}

/// POST /api/v1/applications/{id}/reject
///
/// `add_to_talent_pool` keeps the candidate for future openings.
pub async fn reject_application(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RejectRequest>,
) -> AppResult<Json<DataResponse<JobApplication>>> {
    validate_rejection_reason(&input.reason)?;

    let mut tx = state.pool.begin().await?;

    let current = JobApplicationRepo::find_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    user.scope().ensure_can_access(current.property_id)?;
    ensure_reviewable(ApplicationStatus::parse(&current.status)?)?;

    let status = rejection_status(input.add_to_talent_pool);
    let application = JobApplicationRepo::mark_rejected(
        &mut tx,
        id,
        status.as_str(),
        input.reason.trim(),
        user.user_id,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Application has already been reviewed".into(),
        ))
    })?;

    let action = match status {
        ApplicationStatus::TalentPool => actions::TALENT_POOL,
        _ => actions::REJECT,
    };
    AuditLogRepo::append(
        &mut tx,
        &CreateAuditLog::new(user.actor(), action, entities::JOB_APPLICATION, id)
            .by_user(user.user_id)
            .in_property(application.property_id)
            .with_old(json!({ "status": ApplicationStatus::Pending }))
            .with_new(json!({
                "status": status,
                "reason": application.rejection_reason,
            })),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(application_id = id, status = %status, "Application rejected");

    if input.notify_applicant {
        let event_type = match status {
            ApplicationStatus::TalentPool => event_types::APPLICATION_TALENT_POOL,
            _ => event_types::APPLICATION_REJECTED,
        };
        state.event_bus.publish(
            DomainEvent::new(event_type)
                .with_source(entities::JOB_APPLICATION, id)
                .with_actor(user.user_id)
                .in_property(application.property_id)
                .with_notice(&RejectionNotice {
                    applicant_email: application.email.clone(),
                    applicant_name: application.full_name(),
                    property_name: notice::property_name(&state.pool, application.property_id)
                        .await,
                    position: application.position.clone(),
                    talent_pool: status == ApplicationStatus::TalentPool,
                }),
        );
    }

    Ok(Json(DataResponse { data: application }))
}
