/**
 * Health Routes
 * Liveness and readiness endpoints plus the API index
 */
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;

// Track server start time for uptime calculation
lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

/// Initialize the server start time
pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub database: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// GET /api/health - always 200 while the process is serving
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "AboutSL Backend is running!".to_string(),
        database: state.store.backend().to_string(),
        timestamp: Utc::now(),
        uptime: SERVER_START.elapsed().as_secs(),
    })
}

/// GET /api/health/ready - 503 until the store answers
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let database = state.store.backend().to_string();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready".to_string(),
                timestamp: Utc::now(),
                database,
                response_time: Some(started.elapsed().as_millis() as u64),
                reason: None,
            }),
        ),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    status: "not ready".to_string(),
                    timestamp: Utc::now(),
                    database,
                    response_time: None,
                    reason: Some(e.to_string()),
                }),
            )
        }
    }
}

/// GET / - endpoint index
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to AboutSL API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "auth": "/api/auth",
            "destinations": "/api/destinations",
            "hotels": "/api/hotels",
            "restaurants": "/api/restaurants",
            "reviews": "/api/reviews",
            "heroSlides": "/api/hero-slides",
            "aboutPage": "/api/about-page",
            "contactPage": "/api/contact-page",
            "upload": "/api/upload",
        }
    }))
}
