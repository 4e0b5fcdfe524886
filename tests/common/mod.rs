//! Shared helpers for the HTTP-level tests: a full router over the memory
//! store, request builders and an admin bootstrap.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tourism_backend::config::AppConfig;
use tourism_backend::create_app;
use tourism_backend::db::MemoryStore;
use tourism_backend::state::AppState;

pub fn test_config() -> AppConfig {
    AppConfig {
        bcrypt_cost: 4,
        jwt_secret: "test-secret".to_string(),
        upload_dir: std::env::temp_dir().join("tourism-backend-tests"),
        ..AppConfig::default()
    }
}

pub fn app() -> Router {
    app_with(test_config())
}

pub fn app_with(config: AppConfig) -> Router {
    let state = AppState::new(config, Arc::new(MemoryStore::new()));
    create_app(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, request(Method::GET, uri, token, None)).await
}

pub async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, request(Method::POST, uri, token, Some(body))).await
}

pub async fn put(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn patch(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, request(Method::PATCH, uri, Some(token), None)).await
}

pub async fn delete(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Registers the first (super) admin and returns its token.
pub async fn admin_token(app: &Router) -> String {
    let (status, body) = post(
        app,
        "/api/auth/register",
        None,
        json!({ "email": "admin@aboutsl.com", "password": "Admin@123", "name": "Super Admin" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

pub fn hotel_body(name: &str) -> Value {
    json!({
        "name": name,
        "category": "luxury",
        "price": 120,
        "heroImage": "https://cdn.example.com/hotel.jpg",
        "fullDescription": "<p>Sea view rooms</p>",
    })
}

pub fn restaurant_body(name: &str) -> Value {
    json!({
        "name": name,
        "cuisine": "Sri Lankan",
        "price": 15,
        "heroImage": "https://cdn.example.com/food.jpg",
        "fullDescription": "Rice and curry",
        "specialty": "Crab curry",
    })
}

pub fn destination_body(name: &str) -> Value {
    json!({
        "name": name,
        "region": "Southern Province",
        "category": "cultural",
        "heroImage": "https://cdn.example.com/fort.jpg",
    })
}

/// Creates a listing and returns its id.
pub async fn create(app: &Router, token: &str, collection: &str, body: Value) -> i64 {
    let (status, created) = post(app, &format!("/api/{collection}"), Some(token), body).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    created["data"]["id"].as_i64().unwrap()
}

/// Creates a listing and toggles it from draft to active.
pub async fn create_active(app: &Router, token: &str, collection: &str, body: Value) -> i64 {
    let id = create(app, token, collection, body).await;
    let (status, _) = patch(app, &format!("/api/{collection}/{id}/status"), token).await;
    assert_eq!(status, StatusCode::OK);
    id
}
