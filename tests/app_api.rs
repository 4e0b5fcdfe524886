mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

#[tokio::test]
async fn unknown_routes_use_the_error_envelope() {
    let app = app();
    let (status, body) = get(&app, "/api/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Route not found" }));
}

#[tokio::test]
async fn health_reports_the_backend() {
    let app = app();
    let (status, body) = get(&app, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["database"], "memory");

    let (status, body) = get(&app, "/api/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn login_flow_and_throttle() {
    let config = tourism_backend::config::AppConfig {
        login_max_attempts: 4,
        ..test_config()
    };
    let app = app_with(config);
    admin_token(&app).await;

    let good = json!({ "email": "Admin@AboutSL.com", "password": "Admin@123" });
    let (status, body) = post(&app, "/api/auth/login", None, good.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admin"]["role"], "super-admin");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = get(&app, "/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Super Admin");

    let bad = json!({ "email": "admin@aboutsl.com", "password": "wrong" });
    for _ in 0..3 {
        let (status, body) = post(&app, "/api/auth/login", None, bad.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    // every attempt counts, including the successful one
    let (status, body) = post(&app, "/api/auth/login", None, good).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn registration_closes_after_first_admin() {
    let app = app();
    let token = admin_token(&app).await;

    let body = json!({ "email": "editor@aboutsl.com", "password": "secret1", "name": "Editor" });
    let (status, _) = post(&app, "/api/auth/register", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, created) = post(&app, "/api/auth/register", Some(&token), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["admin"]["role"], "admin");

    let (status, dup) = post(&app, "/api/auth/register", Some(&token), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(dup["message"], "Admin with this email already exists");
}

#[tokio::test]
async fn upload_requires_admin() {
    let app = app();
    let (status, _) = post(&app, "/api/upload/image", None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
