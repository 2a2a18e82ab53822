//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// Password missing or empty.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account with the given email.
    #[error("user not found")]
    UserNotFound,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No session token on the request.
    #[error("no token provided")]
    MissingToken,

    /// Token failed signature validation or no longer resolves to a user.
    #[error("invalid token")]
    InvalidToken,

    /// Token is past its validity horizon.
    #[error("token expired")]
    TokenExpired,

    /// Token could not be signed.
    #[error("token signing failed")]
    TokenSigning,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
