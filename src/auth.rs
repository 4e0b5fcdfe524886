//! Token, password and session mechanics for the admin gate.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::content::visibility::Viewer;
use crate::db::models::{Admin, AdminRole};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ============================================================================
// Tokens
// ============================================================================

/// JWT claims. `sub` is the admin id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, admin: &Admin) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: admin.id,
            email: admin.email.clone(),
            role: admin.role.as_str().to_string(),
            exp: i64::try_from(self.ttl.as_secs())
                .map_or(i64::MAX, |ttl| now.saturating_add(ttl)),
            iat: now,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            tracing::error!("Failed to create access token: {}", e);
            AppError::internal("Failed to create token")
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}

/// Extract bearer token from Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// ============================================================================
// Passwords
// ============================================================================

/// bcrypt is CPU-bound, so it runs on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    match tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await {
        Ok(Ok(hash)) => Ok(hash),
        Ok(Err(e)) => {
            tracing::error!("Failed to hash password: {}", e);
            Err(AppError::internal("Failed to process password"))
        }
        Err(e) => {
            tracing::error!("spawn_blocking panic during hash: {}", e);
            Err(AppError::internal("Failed to process password"))
        }
    }
}

pub async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    match tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
        Ok(Ok(valid)) => Ok(valid),
        Ok(Err(e)) => {
            tracing::warn!("Stored password hash is unreadable: {}", e);
            Ok(false)
        }
        Err(e) => {
            tracing::error!("spawn_blocking panic during verify: {}", e);
            Err(AppError::internal("Failed to process password"))
        }
    }
}

// ============================================================================
// Login throttle
// ============================================================================

/// Sliding-window attempt counter per client IP.
pub struct LoginLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
}

impl LoginLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Records an attempt and reports whether it is allowed.
    pub async fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().await;

        // Drop expired entries so the map tracks only active clients.
        attempts.retain(|_, times| {
            while times
                .front()
                .is_some_and(|t| now.duration_since(*t) >= self.window)
            {
                times.pop_front();
            }
            !times.is_empty()
        });

        let times = attempts.entry(ip).or_default();
        if times.len() >= self.max_attempts {
            return false;
        }
        times.push_back(now);
        true
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// An authenticated, active admin. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Admin);

impl AdminSession {
    pub fn require_role(&self, role: AdminRole) -> AppResult<()> {
        if self.0.role != role {
            return Err(AppError::forbidden(format!(
                "Role {} is not authorized",
                self.0.role
            )));
        }
        Ok(())
    }
}

/// Resolves the bearer token in `headers` to an active admin.
pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> AppResult<Admin> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::unauthorized("Not authorized to access this route"))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        AppError::unauthorized("Not authorized to access this route")
    })?;

    let admin = state
        .store
        .find_admin(claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("Admin not found"))?;

    if !admin.is_active {
        return Err(AppError::unauthorized("Admin account is deactivated"));
    }

    Ok(admin)
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state)
            .await
            .map(AdminSession)
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    /// Any failure to authenticate degrades to a public viewer, except a
    /// store outage, which is surfaced.
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if bearer_token(&parts.headers).is_none() {
            return Ok(Viewer::Public);
        }
        match authenticate(&parts.headers, state).await {
            Ok(_) => Ok(Viewer::Admin),
            Err(err @ (AppError::StoreUnavailable | AppError::Database(_))) => Err(err),
            Err(_) => Ok(Viewer::Public),
        }
    }
}
