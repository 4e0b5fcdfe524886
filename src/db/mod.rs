pub mod codec;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod rows;
pub mod sections;
pub mod store;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{ListFilter, Store};

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DbConfig {
    /// Pool settings from the environment, or `None` when `DATABASE_URL` is unset.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())?;
        Some(Self {
            url,
            max_connections: env_or("DB_POOL_MAX", 5),
            min_connections: env_or("DB_POOL_MIN", 0),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT", 30),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT", 10),
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Hides the password part of a connection URL.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..])
        }
        _ => url.to_string(),
    }
}

pub async fn init_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Initializing database connection pool...");
    tracing::debug!("Database URL: {}", redact_url(&config.url));

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    tracing::info!(
        max = config.max_connections,
        min = config.min_connections,
        "Database connection pool initialized successfully"
    );

    Ok(pool)
}

const LISTING_COLUMNS: &str = r#"
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    hero_image TEXT NOT NULL DEFAULT '',
    hero_image_public_id TEXT,
    meta_description TEXT,
    keywords JSONB,
    status TEXT NOT NULL DEFAULT 'draft'
        CHECK (status IN ('draft', 'active', 'inactive')),
    published_date TIMESTAMPTZ,
    completeness INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
"#;

/// Schema statements, executed one at a time in order.
fn schema() -> Vec<String> {
    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS destinations (
                {LISTING_COLUMNS},
                region TEXT NOT NULL,
                category TEXT NOT NULL
                    CHECK (category IN ('beach', 'nature', 'cultural', 'wildlife')),
                overview JSONB,
                history_and_legend JSONB,
                where_is_located JSONB,
                how_to_go JSONB,
                what_to_see JSONB,
                best_time_to_visit JSONB,
                things_to_do JSONB,
                where_to_stay JSONB,
                where_to_eat JSONB,
                travel_tips JSONB,
                nearby_destinations JSONB
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS hotels (
                {LISTING_COLUMNS},
                category TEXT NOT NULL
                    CHECK (category IN ('luxury', 'mid-range', 'budget')),
                price DOUBLE PRECISION,
                currency TEXT NOT NULL DEFAULT 'USD',
                photo_gallery JSONB,
                quick_summary TEXT NOT NULL DEFAULT '',
                full_description TEXT NOT NULL DEFAULT '',
                amenities JSONB,
                location JSONB,
                contact JSONB,
                nearby_destinations JSONB,
                rating DOUBLE PRECISION NOT NULL DEFAULT 0,
                review_count INTEGER NOT NULL DEFAULT 0
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS restaurants (
                {LISTING_COLUMNS},
                cuisine TEXT NOT NULL,
                price DOUBLE PRECISION,
                price_range TEXT
                    CHECK (price_range IN ('$', '$$', '$$$', '$$$$')),
                currency TEXT NOT NULL DEFAULT 'USD',
                specialty TEXT NOT NULL DEFAULT '',
                photo_gallery JSONB,
                quick_summary TEXT NOT NULL DEFAULT '',
                full_description TEXT NOT NULL DEFAULT '',
                menu_highlights JSONB,
                hours JSONB,
                location JSONB,
                contact JSONB,
                nearby_destinations JSONB,
                rating DOUBLE PRECISION NOT NULL DEFAULT 0,
                review_count INTEGER NOT NULL DEFAULT 0
            )
            "#
        ),
        "CREATE INDEX IF NOT EXISTS idx_destinations_status_created ON destinations(status, created_at DESC)".into(),
        "CREATE INDEX IF NOT EXISTS idx_hotels_status_created ON hotels(status, created_at DESC)".into(),
        "CREATE INDEX IF NOT EXISTS idx_restaurants_status_created ON restaurants(status, created_at DESC)".into(),
        r#"
        CREATE TABLE IF NOT EXISTS nearby_links (
            source_kind TEXT NOT NULL,
            source_id BIGINT NOT NULL,
            target_kind TEXT NOT NULL,
            target_id BIGINT NOT NULL,
            distance DOUBLE PRECISION,
            unit TEXT NOT NULL DEFAULT 'km',
            position INTEGER NOT NULL DEFAULT 0
        )
        "#
        .into(),
        "CREATE INDEX IF NOT EXISTS idx_nearby_links_target ON nearby_links(target_kind, target_id, source_kind)".into(),
        "CREATE INDEX IF NOT EXISTS idx_nearby_links_source ON nearby_links(source_kind, source_id)".into(),
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id BIGSERIAL PRIMARY KEY,
            item_type TEXT NOT NULL
                CHECK (item_type IN ('Destination', 'Hotel', 'Restaurant')),
            item_id BIGINT NOT NULL,
            user_name TEXT NOT NULL,
            user_email TEXT NOT NULL,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            title TEXT NOT NULL DEFAULT '',
            comment TEXT NOT NULL,
            photos JSONB,
            helpful INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'approved', 'rejected')),
            moderated_by BIGINT,
            moderated_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#
        .into(),
        "CREATE INDEX IF NOT EXISTS idx_reviews_item ON reviews(item_type, item_id, status)".into(),
        r#"
        CREATE TABLE IF NOT EXISTS hero_slides (
            id BIGSERIAL PRIMARY KEY,
            image TEXT NOT NULL,
            image_public_id TEXT,
            title TEXT NOT NULL,
            subtitle TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            badge TEXT NOT NULL DEFAULT '',
            sort_order INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'inactive')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#
        .into(),
        r#"
        CREATE TABLE IF NOT EXISTS about_page (
            id BIGINT PRIMARY KEY CHECK (id = 1),
            header_image TEXT NOT NULL DEFAULT '',
            header_image_public_id TEXT,
            stats JSONB,
            story_title TEXT NOT NULL DEFAULT 'Our Story',
            story_paragraph1 TEXT NOT NULL DEFAULT '',
            story_paragraph2 TEXT NOT NULL DEFAULT '',
            story_paragraph3 TEXT NOT NULL DEFAULT '',
            company_values JSONB,
            team_members JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#
        .into(),
        r#"
        CREATE TABLE IF NOT EXISTS contact_page (
            id BIGINT PRIMARY KEY CHECK (id = 1),
            header_image TEXT NOT NULL DEFAULT '',
            header_image_public_id TEXT,
            email JSONB,
            phone JSONB,
            address JSONB,
            whatsapp TEXT NOT NULL DEFAULT '',
            facebook TEXT NOT NULL DEFAULT '',
            instagram TEXT NOT NULL DEFAULT '',
            twitter TEXT NOT NULL DEFAULT '',
            business_hours JSONB,
            timezone TEXT NOT NULL DEFAULT 'Sri Lanka Standard Time (UTC +5:30)',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#
        .into(),
        r#"
        CREATE TABLE IF NOT EXISTS admins (
            id BIGSERIAL PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'admin'
                CHECK (role IN ('admin', 'super-admin')),
            is_active BOOLEAN NOT NULL DEFAULT true,
            last_login TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#
        .into(),
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_admins_email_lower ON admins(lower(email))".into(),
    ]
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    for statement in schema() {
        sqlx::query(&statement).execute(pool).await?;
    }

    tracing::info!("Database migrations completed successfully");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url_hides_password() {
        assert_eq!(
            redact_url("postgres://tour:hunter2@db:5432/tourism"),
            "postgres://tour:***@db:5432/tourism"
        );
        assert_eq!(redact_url("postgres://db/tourism"), "postgres://db/tourism");
    }

    #[test]
    fn test_env_or_falls_back() {
        let value: u32 = env_or("TOURISM_TEST_UNSET_VARIABLE", 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn test_schema_has_link_index() {
        let statements = schema();
        assert!(statements
            .iter()
            .any(|s| s.contains("nearby_links(target_kind, target_id, source_kind)")));
        assert!(statements.iter().all(|s| !s.trim().is_empty()));
    }
}
