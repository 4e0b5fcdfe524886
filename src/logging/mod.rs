/*!
 * Logging Module
 * Subscriber setup and request logging middleware
 */
pub mod middleware;

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::AppConfig;

/// Default directive when `RUST_LOG` is unset.
fn default_directive(config: &AppConfig) -> String {
    let level = config.log_level.clone().unwrap_or_else(|| {
        if config.is_production() {
            "info".to_string()
        } else {
            "debug".to_string()
        }
    });
    format!("tourism_backend={level},tower_http=debug,axum=debug")
}

/// Installs the global subscriber: a rolling `app.log` plus the console,
/// and in production an errors-only `error.log`. JSON in production, pretty
/// otherwise.
///
/// The returned guards flush the background writers and must be held until
/// the server exits.
pub fn init(config: &AppConfig) -> Vec<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
        eprintln!("cannot create log directory {}: {e}", config.log_dir.display());
    }

    let (file_writer, file_guard) = non_blocking(rolling::daily(&config.log_dir, "app.log"));
    let (console_writer, console_guard) = non_blocking(io::stdout());
    let mut guards = vec![file_guard, console_guard];

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.is_production() {
        let (error_writer, error_guard) =
            non_blocking(rolling::daily(&config.log_dir, "error.log"));
        guards.push(error_guard);

        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .pretty();

        subscriber.with(file_layer).with(console_layer).init();
    }

    tracing::info!("Logging initialized for {} environment", config.environment);

    guards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_by_environment() {
        let dev = AppConfig::default();
        assert_eq!(
            default_directive(&dev),
            "tourism_backend=debug,tower_http=debug,axum=debug"
        );

        let prod = AppConfig {
            environment: "production".into(),
            ..AppConfig::default()
        };
        assert!(default_directive(&prod).starts_with("tourism_backend=info"));

        let explicit = AppConfig {
            log_level: Some("warn".into()),
            ..prod
        };
        assert!(default_directive(&explicit).starts_with("tourism_backend=warn"));
    }
}
