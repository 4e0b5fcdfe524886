//! Runtime configuration, read once from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};

use crate::db::DbConfig;

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub database: Option<DbConfig>,
    pub jwt_secret: String,
    pub jwt_expire: Duration,
    pub bcrypt_cost: u32,
    pub frontend_url: Option<String>,
    pub admin_url: Option<String>,
    pub allowed_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub upload_folder: String,
    pub public_base_url: String,
    pub login_max_attempts: usize,
    pub login_window: Duration,
    pub log_level: Option<String>,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            environment: "development".to_string(),
            database: None,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expire: Duration::from_secs(7 * 24 * 60 * 60),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            frontend_url: None,
            admin_url: None,
            allowed_origins: Vec::new(),
            upload_dir: PathBuf::from("uploads"),
            upload_folder: "aboutsl".to_string(),
            public_base_url: String::new(),
            login_max_attempts: 10,
            login_window: Duration::from_secs(15 * 60),
            log_level: None,
            log_dir: PathBuf::from("logs"),
        }
    }
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("invalid {key}: {raw}")))
        .transpose()
}

/// Upper bound for configured durations: 100 years.
const MAX_DURATION_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Parses `90`, `45s`, `30m`, `12h` or `7d`.
pub fn parse_duration(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let (number, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(split) => raw.split_at(split),
        None => (raw, "s"),
    };
    let value: u64 = number
        .parse()
        .with_context(|| format!("invalid duration: {raw}"))?;
    let scale: u64 = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        other => bail!("invalid duration unit '{other}' in {raw}"),
    };
    match value.checked_mul(scale) {
        Some(secs) if secs <= MAX_DURATION_SECS => Ok(Duration::from_secs(secs)),
        _ => bail!("duration out of range: {raw}"),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let jwt_expire = match var("JWT_EXPIRE") {
            Some(raw) => parse_duration(&raw)?,
            None => defaults.jwt_expire,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),
            database: DbConfig::from_env(),
            jwt_secret: var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expire,
            bcrypt_cost: parse_var("BCRYPT_COST")?.unwrap_or(defaults.bcrypt_cost),
            frontend_url: var("FRONTEND_URL"),
            admin_url: var("ADMIN_URL"),
            allowed_origins,
            upload_dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            upload_folder: var("UPLOAD_FOLDER").unwrap_or(defaults.upload_folder),
            public_base_url: var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_base_url),
            login_max_attempts: parse_var("LOGIN_MAX_ATTEMPTS")?
                .unwrap_or(defaults.login_max_attempts),
            login_window: defaults.login_window,
            log_level: var("LOG_LEVEL"),
            log_dir: var("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Origins allowed by CORS: `ALLOWED_ORIGINS` if set, else the frontend
    /// and admin URLs.
    pub fn cors_origins(&self) -> Vec<String> {
        if !self.allowed_origins.is_empty() {
            return self.allowed_origins.clone();
        }
        self.frontend_url
            .iter()
            .chain(self.admin_url.iter())
            .cloned()
            .collect()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.is_production() && self.jwt_secret == DEFAULT_JWT_SECRET {
            bail!("JWT_SECRET must be set in production");
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31");
        }
        Ok(())
    }
}
