//! Tourism content backend: library for app logic and testing

pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
pub mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use chrono::Utc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::content::defaults;
use crate::db::{MemoryStore, PgStore, Store};
use crate::error::AppError;
use crate::routes::upload::UPLOAD_BODY_LIMIT;
use crate::state::AppState;

/// Cap for every non-upload request body.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// CORS for the configured frontend and admin origins. Falls back to the
/// local dev servers when nothing is configured.
pub fn configure_cors(config: &AppConfig) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        origins = vec![
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:5173"),
        ];
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}

fn content_routes() -> Router<AppState> {
    use crate::routes::{
        auth, destinations, health, hero_slides, hotels, pages, restaurants, reviews,
    };

    Router::new()
        .route("/", get(health::index))
        .route("/api/health", get(health::health))
        .route("/api/health/ready", get(health::health_ready))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/destinations",
            get(destinations::list_destinations).post(destinations::create_destination),
        )
        .route(
            "/api/destinations/{id}",
            get(destinations::get_destination)
                .put(destinations::update_destination)
                .delete(destinations::delete_destination),
        )
        .route(
            "/api/destinations/{id}/status",
            patch(destinations::toggle_destination_status),
        )
        .route(
            "/api/hotels",
            get(hotels::list_hotels).post(hotels::create_hotel),
        )
        .route(
            "/api/hotels/{id}",
            get(hotels::get_hotel)
                .put(hotels::update_hotel)
                .delete(hotels::delete_hotel),
        )
        .route("/api/hotels/{id}/status", patch(hotels::toggle_hotel_status))
        .route(
            "/api/restaurants",
            get(restaurants::list_restaurants).post(restaurants::create_restaurant),
        )
        .route(
            "/api/restaurants/{id}",
            get(restaurants::get_restaurant)
                .put(restaurants::update_restaurant)
                .delete(restaurants::delete_restaurant),
        )
        .route(
            "/api/restaurants/{id}/status",
            patch(restaurants::toggle_restaurant_status),
        )
        // The first segment shares one parameter name so the item listing
        // and the per-review actions can coexist in the router.
        .route("/api/reviews", post(reviews::create_review))
        .route(
            "/api/reviews/{id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/api/reviews/{id}/{item_id}", get(reviews::list_reviews))
        .route("/api/reviews/{id}/helpful", post(reviews::mark_helpful))
        .route("/api/reviews/{id}/approve", patch(reviews::approve_review))
        .route("/api/reviews/{id}/reject", patch(reviews::reject_review))
        .route(
            "/api/hero-slides",
            get(hero_slides::list_slides).post(hero_slides::create_slide),
        )
        .route("/api/hero-slides/reorder", put(hero_slides::reorder_slides))
        .route(
            "/api/hero-slides/{id}",
            get(hero_slides::get_slide)
                .put(hero_slides::update_slide)
                .delete(hero_slides::delete_slide),
        )
        .route(
            "/api/hero-slides/{id}/status",
            patch(hero_slides::toggle_slide_status),
        )
        .route(
            "/api/about-page",
            get(pages::get_about_page).put(pages::update_about_page),
        )
        .route(
            "/api/contact-page",
            get(pages::get_contact_page).put(pages::update_contact_page),
        )
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
}

fn upload_routes() -> Router<AppState> {
    use crate::routes::upload;

    Router::new()
        .route("/api/upload/image", post(upload::upload_image))
        .route("/api/upload/images", post(upload::upload_images))
        .route("/api/upload/{public_id}", delete(upload::delete_image))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(UPLOAD_BODY_LIMIT))
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(&state.config);
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .merge(content_routes())
        .merge(upload_routes())
        .nest_service("/uploads", uploads)
        .fallback(route_not_found)
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

/// Picks the store: PostgreSQL when `DATABASE_URL` is set, otherwise the
/// in-process memory store.
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    match &config.database {
        Some(db_config) => {
            let pool = db::init_pool(db_config)
                .await
                .context("failed to connect to PostgreSQL")?;
            db::run_migrations(&pool)
                .await
                .context("failed to run database migrations")?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Using the in-memory store; data is lost on exit.");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Run the server (used by main).
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    config.validate()?;

    // Held until the server exits so buffered log lines are flushed.
    let _log_guards = logging::init(&config);

    routes::health::init_start_time();

    let store = open_store(&config).await?;

    let now = Utc::now();
    store
        .ensure_about_page(&defaults::about_page(now))
        .await
        .context("failed to initialise the about page")?;
    store
        .ensure_contact_page(&defaults::contact_page(now))
        .await
        .context("failed to initialise the contact page")?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid HOST/PORT: {}:{}", config.host, config.port))?;

    let app = create_app(AppState::new(config, store));

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_app_builds_router() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()));
        let _app = create_app(state);
    }

    #[test]
    fn test_configure_cors_skips_invalid_origins() {
        let config = AppConfig {
            allowed_origins: vec!["https://aboutsl.com".into(), "bad\norigin".into()],
            ..AppConfig::default()
        };
        let _cors = configure_cors(&config);
    }
}
