//! Staff login, refresh rotation, lockout and account administration.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_property, create_staff, get_auth, post_json, post_json_auth, token_for,
    TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

async fn login(pool: &PgPool, email: &str, password: &str) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_tokens_with_property(pool: PgPool) {
    let property = create_property(&pool, "Harbor Inn").await;
    let manager = create_staff(&pool, "gm@harbor.example", "manager", Some(property.id)).await;

    let response = login(&pool, "GM@harbor.example", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["id"], manager.id);
    assert_eq!(json["user"]["role"], "manager");
    assert_eq!(json["user"]["property_id"], property.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_unknown_email_are_401(pool: PgPool) {
    create_staff(&pool, "hr@innkeep.example", "hr", None).await;

    let response = login(&pool, "hr@innkeep.example", "wrong-password-here").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = login(&pool, "ghost@innkeep.example", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_locks_after_five_failures(pool: PgPool) {
    create_staff(&pool, "hr@innkeep.example", "hr", None).await;

    for _ in 0..5 {
        let response = login(&pool, "hr@innkeep.example", "wrong-password-here").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = login(&pool, "hr@innkeep.example", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_token_rotates(pool: PgPool) {
    create_staff(&pool, "hr@innkeep.example", "hr", None).await;
    let json = body_json(login(&pool, "hr@innkeep.example", TEST_PASSWORD).await).await;
    let first = json["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/refresh", json!({ "refresh_token": first })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["refresh_token"], first.as_str());

    // The old refresh token is spent.
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/refresh", json!({ "refresh_token": first })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    create_staff(&pool, "hr@innkeep.example", "hr", None).await;
    let json = body_json(login(&pool, "hr@innkeep.example", TEST_PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/auth/logout", json!({}), access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response =
        post_json(app, "/api/v1/auth/refresh", json!({ "refresh_token": refresh })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hr_creates_manager_only_with_property(pool: PgPool) {
    let property = create_property(&pool, "Harbor Inn").await;
    let hr = create_staff(&pool, "hr@innkeep.example", "hr", None).await;
    let token = token_for(&hr);

    let body = json!({
        "email": "gm@harbor.example",
        "password": "a-long-enough-password",
        "first_name": "Sam",
        "last_name": "Ng",
        "role": "manager"
    });
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/admin/users", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = body;
    body["property_id"] = json!(property.id);
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/admin/users", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["property_id"], property.id);
    assert!(created["data"].get("password_hash").is_none());

    // Same email again violates uq_users_email.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}
