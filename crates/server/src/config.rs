//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//! - `BAZAAR_SESSION_SECRET` - Session token signing secret (min 32 chars)
//!
//! ## Optional
//! - `BAZAAR_HOST` - Bind address (default: 127.0.0.1)
//! - `BAZAAR_PORT` - Listen port (default: 4000)
//! - `BAZAAR_ALLOWED_ORIGIN` - Browser origin allowed to send credentialed
//!   requests (default: <http://localhost:5173>, the SPA dev server)
//! - `BAZAAR_UPLOAD_DIR` - Directory for product image blobs (default: uploads)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "insert",
    "todo",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` connection URL (contains password).
    pub database_url: SecretString,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Session token signing secret.
    pub session_secret: SecretString,
    /// Browser origin allowed to make credentialed requests.
    pub allowed_origin: String,
    /// Directory product image blobs are stored in and served from.
    pub upload_dir: PathBuf,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the session secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BAZAAR_DATABASE_URL")?;
        let host = get_env_or_default("BAZAAR_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("BAZAAR_PORT", "4000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_PORT".to_owned(), e.to_string()))?;

        let session_secret = SecretString::from(get_required_env("BAZAAR_SESSION_SECRET")?);
        validate_session_secret(&session_secret, "BAZAAR_SESSION_SECRET")?;

        let allowed_origin = get_env_or_default("BAZAAR_ALLOWED_ORIGIN", "http://localhost:5173");
        validate_origin(&allowed_origin, "BAZAAR_ALLOWED_ORIGIN")?;

        let upload_dir = PathBuf::from(get_env_or_default("BAZAAR_UPLOAD_DIR", "uploads"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            session_secret,
            allowed_origin,
            upload_dir,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Validate that the session secret is long enough and not a placeholder.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();

    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Validate that the allowed origin is an absolute URL with a host.
fn validate_origin(origin: &str, var_name: &str) -> Result<(), ConfigError> {
    let url = Url::parse(origin)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_owned(), e.to_string()))?;

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_owned(),
            "origin must have a host".to_owned(),
        ));
    }

    Ok(())
}
