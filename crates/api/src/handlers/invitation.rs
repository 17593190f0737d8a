//! Single-step form invitations.
//!
//! Staff send one form (a W-4 update, a new emergency contact) to an
//! existing employee or to someone with no employee record yet. Each
//! invitation gets its own `single_step` session and token.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use innkeep_core::audit::{actions, entities};
use innkeep_core::error::CoreError;
use innkeep_core::onboarding::{OnboardingStep, SessionMode};
use innkeep_core::types::{DbId, Timestamp};
use innkeep_db::models::audit::CreateAuditLog;
use innkeep_db::models::step_invitation::{CreateStepInvitation, StepInvitation};
use innkeep_db::repositories::{AuditLogRepo, EmployeeRepo, PropertyRepo, StepInvitationRepo};
use innkeep_events::notices::InvitationNotice;
use innkeep_events::{event_types, DomainEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, Page};
use crate::sessions::{issue_session, step_invite_expiry, SessionRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    pub step: String,
    #[validate(email)]
    pub recipient_email: String,
    #[validate(length(min = 1, max = 200))]
    pub recipient_name: Option<String>,
    /// Existing employee the form is for. The property comes from the
    /// employee record when set.
    pub employee_id: Option<DbId>,
    /// Required when `employee_id` is absent.
    pub property_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct InvitationListParams {
    pub property_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub invitation: StepInvitation,
    pub token: String,
    pub form_url: String,
    pub expires_at: Timestamp,
}

/// Parse the requested step and refuse steps that cannot stand alone.
fn invitable_step(value: &str) -> Result<OnboardingStep, CoreError> {
    let step = OnboardingStep::parse(value)?;
    if !step.is_invitable() {
        return Err(CoreError::Validation(format!(
            "Step '{step}' cannot be sent as a single-step invitation"
        )));
    }
    Ok(step)
}

/// POST /api/v1/onboarding/invitations
pub async fn create_invitation(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateInvitationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<InvitationResponse>>)> {
    input.validate()?;
    let step = invitable_step(&input.step)?;

    let (property_id, manager_id) = match input.employee_id {
        Some(employee_id) => {
            let employee = EmployeeRepo::find_by_id(&state.pool, employee_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Employee",
                    id: employee_id,
                }))?;
            (employee.property_id, employee.manager_id)
        }
        None => {
            let property_id = input.property_id.or(user.property_id).ok_or_else(|| {
                AppError::BadRequest("property_id is required without employee_id".into())
            })?;
            (property_id, None)
        }
    };
    user.scope().ensure_can_access(property_id)?;

    let property = PropertyRepo::find_active(&state.pool, property_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Property",
            id: property_id,
        }))?;

    let mut tx = state.pool.begin().await?;

    let issued = issue_session(
        &mut tx,
        &state.config.jwt.secret,
        &SessionRequest {
            employee_id: input.employee_id,
            property_id,
            manager_id,
            created_by: user.user_id,
            email: &input.recipient_email,
            mode: SessionMode::SingleStep,
            target_step: Some(step),
            expires_at: step_invite_expiry(&state.config.onboarding, Utc::now()),
        },
    )
    .await?;

    let invitation = StepInvitationRepo::create(
        &mut tx,
        &CreateStepInvitation {
            session_id: issued.session.id,
            property_id,
            employee_id: input.employee_id,
            step: step.as_str().to_string(),
            recipient_email: input.recipient_email.clone(),
            recipient_name: input.recipient_name.clone(),
            sent_by: Some(user.user_id),
        },
    )
    .await?;

    AuditLogRepo::append(
        &mut tx,
        &CreateAuditLog::new(
            user.actor(),
            actions::CREATE,
            entities::STEP_INVITATION,
            invitation.id,
        )
        .by_user(user.user_id)
        .in_property(property_id)
        .with_new(json!({
            "step": step,
            "session_id": invitation.session_id,
            "employee_id": invitation.employee_id,
            "recipient_email": invitation.recipient_email,
        })),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        invitation_id = invitation.id,
        session_id = issued.session.id,
        step = %step,
        "Single-step invitation created"
    );

    let form_url = state.config.onboarding.step_form_url(&issued.token);
    let expires_at = issued.session.expires_at;

    state.event_bus.publish(
        DomainEvent::new(event_types::ONBOARDING_INVITATION)
            .with_source(entities::STEP_INVITATION, invitation.id)
            .with_actor(user.user_id)
            .in_property(property_id)
            .with_notice(&InvitationNotice {
                recipient_email: invitation.recipient_email.clone(),
                recipient_name: invitation.recipient_name.clone(),
                property_name: property.name,
                step_title: step.title().to_string(),
                form_url: form_url.clone(),
                expires_at,
            }),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: InvitationResponse {
                invitation,
                token: issued.token,
                form_url,
                expires_at,
            },
        }),
    ))
}

/// GET /api/v1/onboarding/invitations
pub async fn list_invitations(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<InvitationListParams>,
) -> AppResult<Json<DataResponse<Page<StepInvitation>>>> {
    let property_id = user.scope().list_filter(params.property_id)?;
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();

    let items = StepInvitationRepo::list(&state.pool, property_id, limit, offset).await?;
    let total = StepInvitationRepo::count(&state.pool, property_id).await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total,
            limit,
            offset,
        },
    }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn final_review_cannot_be_invited() {
        assert_matches!(invitable_step("final_review"), Err(CoreError::Validation(_)));
        assert_matches!(invitable_step("w4_form"), Ok(OnboardingStep::W4Form));
        assert_matches!(invitable_step("tax_forms"), Err(CoreError::Validation(_)));
    }
}
