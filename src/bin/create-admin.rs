//! Seeds the first super-admin into the PostgreSQL store.
//!
//! Usage: create-admin [EMAIL] [PASSWORD] [NAME]
//! Missing arguments fall back to ADMIN_EMAIL, ADMIN_PASSWORD and ADMIN_NAME.

use std::env;

use anyhow::{bail, Context};
use chrono::Utc;
use tourism_backend::auth::hash_password;
use tourism_backend::config::AppConfig;
use tourism_backend::db::models::{Admin, AdminRole};
use tourism_backend::db::{self, PgStore, Store};

const DEFAULT_EMAIL: &str = "admin@aboutsl.com";
const DEFAULT_NAME: &str = "Super Admin";

fn arg_or_env(index: usize, key: &str) -> Option<String> {
    env::args()
        .nth(index)
        .or_else(|| env::var(key).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let Some(db_config) = config.database.as_ref() else {
        bail!("DATABASE_URL must be set to create an admin");
    };

    let email = arg_or_env(1, "ADMIN_EMAIL")
        .unwrap_or_else(|| DEFAULT_EMAIL.to_string())
        .to_lowercase();
    let Some(password) = arg_or_env(2, "ADMIN_PASSWORD") else {
        bail!("Usage: create-admin [EMAIL] <PASSWORD> [NAME] (or set ADMIN_PASSWORD)");
    };
    if password.len() < 6 {
        bail!("password must be at least 6 characters");
    }
    let name = arg_or_env(3, "ADMIN_NAME").unwrap_or_else(|| DEFAULT_NAME.to_string());

    let pool = db::init_pool(db_config)
        .await
        .context("failed to connect to PostgreSQL")?;
    db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    let store = PgStore::new(pool);

    if store.find_admin_by_email(&email).await?.is_some() {
        println!("Admin already exists with email: {email}");
        return Ok(());
    }

    let now = Utc::now();
    let password_hash = hash_password(password, config.bcrypt_cost).await?;
    let admin = store
        .insert_admin(&Admin {
            id: 0,
            email,
            password_hash,
            name,
            role: AdminRole::SuperAdmin,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        })
        .await?;

    println!("\nFirst admin created");
    println!("Email : {}", admin.email);
    println!("Name  : {}", admin.name);
    println!("Role  : {}\n", admin.role);
    println!("Change the password after first login.");
    Ok(())
}
