//! Employee-facing onboarding: welcome, step saves, edit locks, completion
//! and single-step invitations.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, create_application, create_property, create_staff, get, get_auth, offer_body,
    post_json_auth, put_json_auth, send, token_for,
};
use innkeep_core::onboarding::OnboardingStep;
use innkeep_events::event_types;
use serde_json::{json, Value};
use sqlx::PgPool;

struct Onboarding {
    manager_token: String,
    employee_id: i64,
    token: String,
}

/// Approve a fresh application and hand back the onboarding token.
async fn approved_employee(pool: &PgPool) -> Onboarding {
    let property = create_property(pool, "Harbor Inn").await;
    let manager = create_staff(pool, "manager@harbor.test", "manager", Some(property.id)).await;
    let application = create_application(pool, property.id, "maria@example.test").await;
    let manager_token = token_for(&manager);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/applications/{}/approve", application.id),
        offer_body(),
        &manager_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    Onboarding {
        manager_token,
        employee_id: json["data"]["employee"]["id"].as_i64().unwrap(),
        token: json["data"]["onboarding_token"].as_str().unwrap().to_string(),
    }
}

fn step_payload(step: OnboardingStep) -> Value {
    match step {
        OnboardingStep::PersonalInfo => json!({
            "first_name": "Maria",
            "last_name": "Lopez",
            "date_of_birth": "1994-03-02",
            "address": "12 Harbor Way",
            "city": "Monterey",
            "state": "CA",
            "zip_code": "93940",
            "phone": "(831) 555-0134"
        }),
        OnboardingStep::EmergencyContacts => json!({
            "contacts": [
                { "name": "Luis Lopez", "relationship": "Brother", "phone": "831-555-0199" }
            ]
        }),
        OnboardingStep::I9Section1 => json!({
            "citizenship_status": "citizen",
            "ssn": "123-45-6789",
            "signature": "Maria Lopez",
            "attested": true
        }),
        OnboardingStep::W4Form => json!({
            "filing_status": "single",
            "signature": "Maria Lopez"
        }),
        OnboardingStep::DirectDeposit => json!({
            "payment_method": "direct_deposit",
            "bank_name": "Coastal Credit Union",
            "routing_number": "021000021",
            "account_number": "000123456789",
            "account_type": "checking",
            "signature": "Maria Lopez"
        }),
        OnboardingStep::HealthInsurance => json!({
            "election": "decline",
            "waiver_reason": "Covered by spouse",
            "signature": "Maria Lopez"
        }),
        OnboardingStep::CompanyPolicies
        | OnboardingStep::TraffickingAwareness
        | OnboardingStep::WeaponsPolicy => json!({
            "acknowledged": true,
            "signature": "Maria Lopez"
        }),
        OnboardingStep::FinalReview => json!({
            "certified": true,
            "signature": "Maria Lopez"
        }),
    }
}

async fn save_step(
    pool: &PgPool,
    token: &str,
    step: OnboardingStep,
    lock_token: Option<&str>,
) -> axum::response::Response {
    let mut body = json!({ "data": step_payload(step) });
    if let Some(lock_token) = lock_token {
        body["lock_token"] = json!(lock_token);
    }
    put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/onboarding/session/steps/{}", step.as_str()),
        body,
        token,
    )
    .await
}

async fn complete(pool: &PgPool, token: &str) -> axum::response::Response {
    send(
        common::build_test_app(pool.clone()),
        Method::POST,
        "/api/v1/onboarding/session/complete",
        Some(token),
        None,
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn welcome_starts_the_session(pool: PgPool) {
    let ob = approved_employee(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/onboarding/welcome/{}", ob.token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["session"]["status"], "in_progress");
    assert_eq!(json["data"]["employee"]["id"], ob.employee_id);
    assert_eq!(json["data"]["property"]["name"], "Harbor Inn");
    assert_eq!(json["data"]["progress"]["completed_count"], 0);
    assert_eq!(json["data"]["progress"]["next_step"], "personal_info");

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_auth(
            app,
            &format!("/api/v1/employees/{}", ob.employee_id),
            &ob.manager_token,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["onboarding_status"], "in_progress");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_step_data_is_rejected(pool: PgPool) {
    let ob = approved_employee(&pool).await;

    let mut data = step_payload(OnboardingStep::PersonalInfo);
    data["zip_code"] = json!("9394");
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        "/api/v1/onboarding/session/steps/personal_info",
        json!({ "data": data }),
        &ob.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        "/api/v1/onboarding/session/steps/payroll_setup",
        json!({ "data": {} }),
        &ob.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn saved_steps_are_redacted_in_the_audit_log(pool: PgPool) {
    let ob = approved_employee(&pool).await;

    let response = save_step(&pool, &ob.token, OnboardingStep::I9Section1, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["completed_count"], 1);

    let hr = create_staff(&pool, "hr@innkeep.test", "hr", None).await;
    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_auth(
            app,
            "/api/v1/audit-logs?entity_type=onboarding_session&action=update",
            &token_for(&hr),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["total"], 1);
    let logged = json["data"]["items"][0]["new_values"].to_string();
    assert!(!logged.contains("123-45-6789"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn edit_lock_blocks_other_writers(pool: PgPool) {
    let ob = approved_employee(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/onboarding/session/lock",
        json!({ "holder": "tablet-front-desk" }),
        &ob.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let lock = body_json(response).await;
    let lock_token = lock["data"]["lock_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let contested = post_json_auth(
        app,
        "/api/v1/onboarding/session/lock",
        json!({ "holder": "phone" }),
        &ob.token,
    )
    .await;
    assert_eq!(contested.status(), StatusCode::CONFLICT);

    let blocked = save_step(&pool, &ob.token, OnboardingStep::W4Form, None).await;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);

    let allowed = save_step(&pool, &ob.token, OnboardingStep::W4Form, Some(&lock_token)).await;
    assert_eq!(allowed.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let wrong = send(
        app,
        Method::DELETE,
        "/api/v1/onboarding/session/lock?lock_token=not-the-token",
        Some(&ob.token),
        None,
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let released = send(
        app,
        Method::DELETE,
        &format!("/api/v1/onboarding/session/lock?lock_token={lock_token}"),
        Some(&ob.token),
        None,
    )
    .await;
    assert_eq!(released.status(), StatusCode::NO_CONTENT);

    let unblocked = save_step(&pool, &ob.token, OnboardingStep::PersonalInfo, None).await;
    assert_eq!(unblocked.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_requires_every_step(pool: PgPool) {
    let ob = approved_employee(&pool).await;

    for step in &OnboardingStep::ALL[..OnboardingStep::ALL.len() - 1] {
        let response = save_step(&pool, &ob.token, *step, None).await;
        assert_eq!(response.status(), StatusCode::OK, "saving {step}");
    }

    let early = complete(&pool, &ob.token).await;
    assert_eq!(early.status(), StatusCode::BAD_REQUEST);
    let json = body_json(early).await;
    assert!(json["error"].as_str().unwrap().contains("final_review"));

    let last = save_step(&pool, &ob.token, OnboardingStep::FinalReview, None).await;
    assert_eq!(last.status(), StatusCode::OK);
    let json = body_json(last).await;
    assert_eq!(json["data"]["can_complete"], true);
    assert_eq!(json["data"]["percent"], 100);

    let done = complete(&pool, &ob.token).await;
    assert_eq!(done.status(), StatusCode::OK);
    let json = body_json(done).await;
    assert_eq!(json["data"]["status"], "completed");

    let late = save_step(&pool, &ob.token, OnboardingStep::W4Form, None).await;
    assert_eq!(late.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_auth(
            app,
            &format!("/api/v1/employees/{}", ob.employee_id),
            &ob.manager_token,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["onboarding_status"], "employee_completed");

    let app = common::build_test_app(pool.clone());
    let reissue = send(
        app,
        Method::POST,
        &format!("/api/v1/employees/{}/onboarding-token", ob.employee_id),
        Some(&ob.manager_token),
        None,
    )
    .await;
    assert_eq!(reissue.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let readable = get_auth(app, "/api/v1/onboarding/session", &ob.token).await;
    assert_eq!(readable.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn single_step_invitation_is_limited_to_its_step(pool: PgPool) {
    let property = create_property(&pool, "Harbor Inn").await;
    let manager = create_staff(&pool, "manager@harbor.test", "manager", Some(property.id)).await;
    let manager_token = token_for(&manager);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/onboarding/invitations",
        json!({
            "step": "w4_form",
            "recipient_email": "contractor@example.test",
            "recipient_name": "Jo Park"
        }),
        &manager_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["invitation"]["property_id"], property.id);
    assert!(json["data"]["invitation"]["employee_id"].is_null());
    assert!(json["data"]["form_url"]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:5173/onboarding/step/"));
    let token = json["data"]["token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &format!("/api/v1/onboarding/welcome/{token}")).await).await;
    assert_eq!(json["data"]["session"]["mode"], "single_step");
    assert_eq!(json["data"]["progress"]["total"], 1);
    assert!(json["data"]["employee"].is_null());

    let other = save_step(&pool, &token, OnboardingStep::PersonalInfo, None).await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);

    let target = save_step(&pool, &token, OnboardingStep::W4Form, None).await;
    assert_eq!(target.status(), StatusCode::OK);

    let done = complete(&pool, &token).await;
    assert_eq!(done.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/onboarding/invitations", &manager_token).await)
        .await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["step"], "w4_form");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn nul_characters_in_step_data_are_a_bad_request(pool: PgPool) {
    let ob = approved_employee(&pool).await;

    let mut data = step_payload(OnboardingStep::W4Form);
    data["signature"] = json!("Maria\u{0}Lopez");
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        "/api/v1/onboarding/session/steps/w4_form",
        json!({ "data": data }),
        &ob.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let clean = save_step(&pool, &ob.token, OnboardingStep::W4Form, None).await;
    assert_eq!(clean.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_completion_announces_the_employee(pool: PgPool) {
    let ob = approved_employee(&pool).await;
    for step in OnboardingStep::ALL {
        let response = save_step(&pool, &ob.token, step, None).await;
        assert_eq!(response.status(), StatusCode::OK, "saving {step}");
    }

    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    let mut events = bus.subscribe();
    let response = send(
        app,
        Method::POST,
        "/api/v1/onboarding/session/complete",
        Some(&ob.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let event = events.try_recv().unwrap();
    assert_eq!(event.event_type, event_types::ONBOARDING_COMPLETED);
    assert_eq!(event.source_entity_id, Some(ob.employee_id));
    assert_eq!(event.payload["manager_email"], "manager@harbor.test");
    assert_eq!(event.payload["property_name"], "Harbor Inn");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn single_step_completion_for_an_employee_is_not_announced(pool: PgPool) {
    let ob = approved_employee(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/onboarding/invitations",
        json!({
            "step": "w4_form",
            "recipient_email": "maria@example.test",
            "employee_id": ob.employee_id
        }),
        &ob.manager_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let token = body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let saved = save_step(&pool, &token, OnboardingStep::W4Form, None).await;
    assert_eq!(saved.status(), StatusCode::OK);

    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    let mut events = bus.subscribe();
    let response = send(
        app,
        Method::POST,
        "/api/v1/onboarding/session/complete",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(events.try_recv().is_err());

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_auth(
            app,
            &format!("/api/v1/employees/{}", ob.employee_id),
            &ob.manager_token,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["onboarding_status"], "not_started");
}
