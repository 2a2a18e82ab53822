//! Database operations.
//!
//! One repository per aggregate:
//!
//! - [`users::UserRepository`] - accounts, credentials, last-issued tokens
//! - [`products::ProductRepository`] - the catalog
//! - [`cart_lines::CartLineRepository`] - per-(user, product) cart lines
//!
//! Queries use the runtime sqlx API (no offline metadata is checked in), and
//! rows decode through private row structs that validate emails, roles, and
//! product keys on the way into domain types.
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and are NOT run on server
//! startup. Run them explicitly:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```

pub mod cart_lines;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart_lines::CartLineRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate email or cart line).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
