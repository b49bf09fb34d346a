//! Integration tests for registration, login and session lifecycle
//!
//! These tests require a running PostgreSQL database. Run with:
//! cargo test -- --ignored

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{parse_json, TestApp};
use miniblog_backend::auth::{SessionService, TokenSigner};
use miniblog_backend::repositories::TokenBlacklistRepository;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_opens_session() {
    let app = TestApp::new().await;

    let tag = uuid::Uuid::new_v4().simple().to_string();
    let body = json!({
        "last_name": "Doe",
        "first_name": "Jane",
        "user_name": format!("jane_{}", &tag[..10]),
        "email": format!("jane_{}@example.com", &tag[..10]),
        "password": "SecurePass123!",
    });

    let (status, response) = app.post("/api/v1/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED, "body: {}", response);
    let json = parse_json(&response);
    assert!(!json["token"].as_str().unwrap().is_empty());
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 3600);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new().await;
    let user = app.register_user().await;

    let tag = uuid::Uuid::new_v4().simple().to_string();
    let body = json!({
        "last_name": "Doe",
        "first_name": "John",
        "user_name": format!("john_{}", &tag[..10]),
        "email": user.email,
        "password": "SecurePass123!",
    });

    let (status, response) = app.post("/api/v1/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    let json = parse_json(&response);
    assert_eq!(json["error"]["code"], "CONFLICT");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Email"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_username_conflicts() {
    let app = TestApp::new().await;
    let user = app.register_user().await;

    let tag = uuid::Uuid::new_v4().simple().to_string();
    let body = json!({
        "last_name": "Doe",
        "first_name": "John",
        "user_name": user.user_name,
        "email": format!("john_{}@example.com", &tag[..10]),
        "password": "SecurePass123!",
    });

    let (status, response) = app.post("/api/v1/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    let json = parse_json(&response);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Username"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_rejects_invalid_fields() {
    let app = TestApp::new().await;

    let body = json!({
        "last_name": "Doe",
        "first_name": "Jane",
        "user_name": "jd",
        "email": "not-an-email",
        "password": "short",
    });

    let (status, response) = app.post("/api/v1/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json = parse_json(&response);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_returns_fresh_token() {
    let app = TestApp::new().await;
    let user = app.register_user().await;

    let body = json!({
        "email": user.email,
        "password": user.password,
    });

    let (status, response) = app.post("/api/v1/auth/login", &body.to_string()).await;

    assert_eq!(status, StatusCode::OK, "body: {}", response);
    let json = parse_json(&response);
    assert!(!json["token"].as_str().unwrap().is_empty());
    assert_eq!(json["token_type"], "Bearer");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    let user = app.register_user().await;

    let wrong_password = json!({
        "email": user.email,
        "password": "WrongPass123!",
    });
    let unknown_user = json!({
        "email": "nobody-here@example.com",
        "password": "WrongPass123!",
    });

    let (status_a, body_a) = app
        .post("/api/v1/auth/login", &wrong_password.to_string())
        .await;
    let (status_b, body_b) = app
        .post("/api/v1/auth/login", &unknown_user.to_string())
        .await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    // The response must not leak whether the account exists
    assert_eq!(body_a, body_b);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_me_returns_own_profile() {
    let app = TestApp::new().await;
    let user = app.register_user().await;

    let (status, response) = app.get_auth("/api/v1/auth/me", &user.token).await;

    assert_eq!(status, StatusCode::OK);
    let json = parse_json(&response);
    assert_eq!(json["id"], user.id);
    assert_eq!(json["user_name"], user.user_name);
    assert_eq!(json["email"], user.email);
    assert_eq!(json["role"], "user");
    // Password material never appears in responses
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_revokes_the_session() {
    let app = TestApp::new().await;
    let user = app.register_user().await;

    let (status, _) = app.get_auth("/api/v1/auth/me", &user.token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = app
        .request("POST", "/api/v1/auth/logout", Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", response);

    let (status, response) = app.get_auth("/api/v1/auth/me", &user.token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let json = parse_json(&response);
    assert_eq!(json["error"]["message"], "Token revoked");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_is_idempotent() {
    let app = TestApp::new().await;
    let user = app.register_user().await;

    let (status, _) = app
        .request("POST", "/api/v1/auth/logout", Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // A second logout with the already-revoked token still succeeds
    let (status, response) = app
        .request("POST", "/api/v1/auth/logout", Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", response);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_revoked_token_still_reads_public_profiles() {
    let app = TestApp::new().await;
    let user = app.register_user().await;

    let (status, _) = app
        .request("POST", "/api/v1/auth/logout", Some(&user.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // Profile reads check the signature but not the blacklist
    let path = format!("/api/v1/users/{}", user.id);
    let (status, _) = app.get_auth(&path, &user.token).await;
    assert_eq!(status, StatusCode::OK);

    // Mutations require an unrevoked session
    let body = json!({ "bio": "still here?" });
    let (status, _) = app.put_auth(&path, &user.token, &body.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_requests_without_credentials_are_rejected() {
    let app = TestApp::new().await;

    let (status, response) = app.get("/api/v1/auth/me").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let json = parse_json(&response);
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_garbage_token_is_forbidden() {
    let app = TestApp::new().await;

    let (status, _) = app
        .get_auth("/api/v1/auth/me", "not.a.real.token")
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_revoke_is_idempotent_at_the_service_level() {
    let app = TestApp::new().await;

    let signer = TokenSigner::new("test-secret-key-for-testing-only-32chars", 3600);
    let sessions = SessionService::new(signer, app.pool.clone());

    let token = sessions.issue(1, "alice", miniblog_shared::Role::User).unwrap();

    sessions.revoke(&token).await.unwrap();
    sessions.revoke(&token).await.unwrap();

    assert!(sessions.is_revoked(&token).await.unwrap());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_sweep_drops_only_expired_blacklist_rows() {
    let app = TestApp::new().await;

    let tag = uuid::Uuid::new_v4().simple().to_string();
    let expired = format!("expired-token-{}", tag);
    let live = format!("live-token-{}", tag);

    TokenBlacklistRepository::insert(&app.pool, &expired, Utc::now() - Duration::hours(2))
        .await
        .unwrap();
    TokenBlacklistRepository::insert(&app.pool, &live, Utc::now() + Duration::hours(1))
        .await
        .unwrap();

    let signer = TokenSigner::new("test-secret-key-for-testing-only-32chars", 3600);
    let sessions = SessionService::new(signer, app.pool.clone());

    let removed = sessions.sweep_expired().await.unwrap();
    assert!(removed >= 1);

    assert!(!TokenBlacklistRepository::exists(&app.pool, &expired)
        .await
        .unwrap());
    assert!(TokenBlacklistRepository::exists(&app.pool, &live)
        .await
        .unwrap());
}
