//! Session token signing and verification.
//!
//! A session is a stateless HS256-signed token carried in the `authToken`
//! cookie. The claims are the complete identity the middleware needs, so
//! verification does not touch the database; only the validity horizon bounds
//! a token's life - there is no server-side revocation list.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use bazaar_core::Role;

use super::AuthError;
use crate::models::User;

/// How long an issued session token stays valid.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (standard JWT `sub` claim).
    pub sub: i32,
    /// User email at issue time.
    pub email: String,
    /// User role at issue time.
    pub role: Role,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// Pre-derived signing and verification keys for the session secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    /// Derive both keys from the configured session secret.
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Issue a signed session token for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenSigning` if encoding fails.
pub fn issue(keys: &TokenKeys, user: &User) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.as_i32(),
        email: user.email.to_string(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + chrono::Duration::days(SESSION_TTL_DAYS)).timestamp(),
    };

    jsonwebtoken::encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|_| AuthError::TokenSigning)
}

/// Verify a token's signature and expiry and return its claims.
///
/// # Errors
///
/// Returns `AuthError::TokenExpired` for a token past its horizon and
/// `AuthError::InvalidToken` for any other validation failure.
pub fn verify(keys: &TokenKeys, token: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    let data =
        jsonwebtoken::decode::<Claims>(token, &keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

    Ok(data.claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::{Email, UserId};

    fn keys() -> TokenKeys {
        TokenKeys::from_secret(b"0Jq6VxMwN3kYtR8pZcDf2HsLbA5eGuW7")
    }

    fn sample_user(role: Role) -> User {
        User {
            id: UserId::new(11),
            fullname: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            password_hash: "hash".to_owned(),
            role,
            last_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_roundtrip_preserves_identity() {
        let keys = keys();
        let token = issue(&keys, &sample_user(Role::Admin)).unwrap();

        let claims = verify(&keys, &token).unwrap();
        assert_eq!(claims.sub, 11);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let keys = keys();
        let token = issue(&keys, &sample_user(Role::User)).unwrap();

        // Flip the last signature character.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(matches!(
            verify(&keys, &tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue(&keys(), &sample_user(Role::User)).unwrap();
        let other = TokenKeys::from_secret(b"a-completely-different-secret-key!");

        assert!(matches!(
            verify(&other, &token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys();
        let now = Utc::now();
        let claims = Claims {
            sub: 11,
            email: "ada@example.com".to_owned(),
            role: Role::User,
            iat: (now - chrono::Duration::days(9)).timestamp(),
            exp: (now - chrono::Duration::days(2)).timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &keys.encoding).unwrap();

        assert!(matches!(
            verify(&keys, &token),
            Err(AuthError::TokenExpired)
        ));
    }
}
