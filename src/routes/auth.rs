/**
 * Authentication Routes
 * Admin login, registration and session lookup
 */
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{self, AdminSession};
use crate::db::models::{Admin, AdminRole};
use crate::error::{AppError, AppResult, FieldError};
use crate::routes::{ApiJson, ApiResponse, Checks};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Admin fields returned alongside a token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: AdminRole,
}

impl From<&Admin> for AdminInfo {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            name: admin.name.clone(),
            role: admin.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub admin: AdminInfo,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    if !state.login_limiter.check(addr.ip()).await {
        tracing::warn!(ip = %addr.ip(), "login throttled");
        return Err(AppError::TooManyRequests(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let email = payload.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::validation("Please provide email and password"));
    }

    let admin = state
        .store
        .find_admin_by_email(&email)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    if !auth::verify_password(password, admin.password_hash.clone()).await? {
        tracing::warn!(email = %email, "failed login");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    if !admin.is_active {
        return Err(AppError::unauthorized("Account is deactivated"));
    }

    let now = Utc::now();
    state.store.record_login(admin.id, now).await?;
    let token = state.tokens.issue(&admin)?;
    tracing::info!(admin = admin.id, "admin logged in");

    Ok(Json(TokenResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        admin: AdminInfo::from(&admin),
    }))
}

/// POST /api/auth/register
///
/// Open while no admin exists, and the first account becomes the
/// super-admin. After that only a super-admin may register new admins.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let role = if state.store.count_admins().await? == 0 {
        AdminRole::SuperAdmin
    } else {
        let session = AdminSession(auth::authenticate(&headers, &state).await?);
        session.require_role(AdminRole::SuperAdmin)?;
        AdminRole::Admin
    };

    let email = payload.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    let name = payload.name.unwrap_or_default().trim().to_string();

    let mut checks = Checks::new();
    checks.require("email", &email);
    if !email.is_empty() && !email.contains('@') {
        checks.push(FieldError::new("email", "Invalid email format"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        checks.push(FieldError::new(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    checks.require("name", &name);
    checks.finish()?;

    if state.store.find_admin_by_email(&email).await?.is_some() {
        return Err(AppError::invalid_fields(vec![FieldError::new(
            "email",
            "Admin with this email already exists",
        )]));
    }

    let now = Utc::now();
    let password_hash = auth::hash_password(password, state.config.bcrypt_cost).await?;
    let admin = state
        .store
        .insert_admin(&Admin {
            id: 0,
            email,
            password_hash,
            name,
            role,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        })
        .await?;

    let token = state.tokens.issue(&admin)?;
    tracing::info!(admin = admin.id, role = %admin.role, "admin registered");

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            success: true,
            message: "Admin registered successfully".to_string(),
            token,
            admin: AdminInfo::from(&admin),
        }),
    ))
}

/// GET /api/auth/me
pub async fn me(AdminSession(admin): AdminSession) -> impl IntoResponse {
    ApiResponse::data(admin)
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client drops its copy.
pub async fn logout() -> impl IntoResponse {
    ApiResponse::message("Logged out successfully")
}
