//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::auth::TokenKeys;
use crate::storage::ImageStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the database pool, the
/// image blob store, and the pre-derived session token keys.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    images: ImageStore,
    token_keys: TokenKeys,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let images = ImageStore::new(config.upload_dir.clone());
        let token_keys = TokenKeys::from_secret(config.session_secret.expose_secret().as_bytes());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                images,
                token_keys,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the image blob store.
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }

    /// Get a reference to the session token keys.
    #[must_use]
    pub fn token_keys(&self) -> &TokenKeys {
        &self.inner.token_keys
    }
}
