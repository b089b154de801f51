use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use findit_db::Database;
use sha2::{Digest, Sha512};
use tracing::error;

use crate::config::AppConfig;
use crate::error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<AppConfig>,
    key: Key,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        // Cookie keys need 64 bytes; SHA-512 stretches any secret to that.
        let key = Key::from(&Sha512::digest(config.secret_key.as_bytes()));
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            key,
        }
    }

    /// Run a store call on the blocking pool.
    pub async fn with_db<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(e.to_string())
            })?
            .map_err(ApiError::Storage)
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}
