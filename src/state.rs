//! Shared handles passed to every handler.

use std::sync::Arc;

use crate::auth::{LoginLimiter, TokenKeys};
use crate::config::AppConfig;
use crate::db::Store;
use crate::storage::{ImageStore, LocalImageStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub images: Arc<dyn ImageStore>,
    pub tokens: Arc<TokenKeys>,
    pub login_limiter: Arc<LoginLimiter>,
}

impl AppState {
    /// Builds the state with a local image store rooted at the configured
    /// upload directory.
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let images = Arc::new(LocalImageStore::new(
            config.upload_dir.clone(),
            config.upload_folder.clone(),
            config.public_base_url.clone(),
        ));
        Self::with_images(config, store, images)
    }

    pub fn with_images(config: AppConfig, store: Arc<dyn Store>, images: Arc<dyn ImageStore>) -> Self {
        let tokens = Arc::new(TokenKeys::new(&config.jwt_secret, config.jwt_expire));
        let login_limiter = Arc::new(LoginLimiter::new(
            config.login_max_attempts,
            config.login_window,
        ));
        Self {
            config: Arc::new(config),
            store,
            images,
            tokens,
            login_limiter,
        }
    }
}
