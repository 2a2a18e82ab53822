//! Authentication service.
//!
//! Registration, password login, and session verification. Passwords are
//! argon2id-hashed; sessions are signed tokens (see [`token`]).

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenKeys};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use bazaar_core::{Email, UserId};

use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    keys: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, keys: &'a TokenKeys) -> Self {
        Self {
            users: UserRepository::new(pool),
            keys,
        }
    }

    /// Register a new user with the default `user` role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::EmptyPassword` for
    /// bad input, and `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        fullname: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        let password_hash = hash_password(password)?;

        self.users
            .create(fullname, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password, issuing a session token.
    ///
    /// The issued token is also persisted onto the user record
    /// (`last_token`), which backs the legacy lookup-by-token path.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account has that email and
    /// `AuthError::InvalidCredentials` if the password doesn't match.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password, &user.password_hash)?;

        let token = token::issue(self.keys, &user)?;
        self.users.set_last_token(user.id, &token).await?;

        Ok((user, token))
    }

    /// Resolve a session token to its user.
    ///
    /// Read-only: verifies signature and expiry, then loads the user the
    /// claims point at.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` / `AuthError::InvalidToken` for bad
    /// tokens, including tokens whose user no longer exists.
    pub async fn verify(&self, token: &str) -> Result<(User, Claims), AuthError> {
        let claims = token::verify(self.keys, token)?;

        let user = self
            .users
            .get(UserId::new(claims.sub))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok((user, claims))
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password doesn't match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("secret1").unwrap();

        // The hash is not the password, and verification round-trips.
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = hash_password("secret1").unwrap();
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_rejected() {
        assert!(matches!(
            verify_password("secret1", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }
}
