//! Admin account management commands.
//!
//! Registration through the API only ever creates regular users; admin
//! accounts are bootstrapped here, or promoted from existing accounts.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use bazaar_core::{Email, Role};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// An account with this email already exists.
    #[error("Account already exists with email: {0}")]
    UserExists(String),

    /// No account with this email.
    #[error("No account with email: {0}")]
    UserNotFound(String),

    /// Password hashing error.
    #[error("Password hashing failed")]
    PasswordHash,
}

/// Create a new admin account.
///
/// # Errors
///
/// Returns `AdminError::UserExists` if the email is already registered.
pub async fn create(email: &str, password: &str, fullname: &str) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;
    let pool = connect().await?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AdminError::PasswordHash)?
        .to_string();

    tracing::info!("Creating admin account: {}", email);

    let user_id = sqlx::query_scalar::<_, i32>(
        r"
        INSERT INTO users (fullname, email, password_hash, role)
        VALUES ($1, $2, $3, 'admin')
        RETURNING id
        ",
    )
    .bind(fullname)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return AdminError::UserExists(email.to_string());
        }
        AdminError::Database(e)
    })?;

    tracing::info!("Admin account created! ID: {}, Email: {}", user_id, email);

    Ok(user_id)
}

/// Set the role of an existing account.
///
/// Demotion takes effect for new sessions; an already-issued token keeps its
/// signed role until it expires.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if no account has that email.
pub async fn set_role(email: &str, role: Role) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;
    let pool = connect().await?;

    let result = sqlx::query(
        r"
        UPDATE users
        SET role = $2, updated_at = now()
        WHERE email = $1
        ",
    )
    .bind(&email)
    .bind(role.as_str())
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::UserNotFound(email.to_string()));
    }

    tracing::info!("Set role of {} to {}", email, role);

    Ok(())
}

async fn connect() -> Result<PgPool, AdminError> {
    let database_url =
        super::database_url().ok_or(AdminError::MissingEnvVar("BAZAAR_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(&database_url).await?)
}
