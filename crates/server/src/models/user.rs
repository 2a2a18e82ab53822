//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Email, Role, UserId};

/// A storefront user (domain type).
///
/// Carries the password hash and the last issued session token; it is never
/// serialized directly. API responses go through [`UserProfile`].
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub fullname: String,
    /// User's email address. Unique across the store.
    pub email: Email,
    /// Argon2 hash of the password. Never leaves the server.
    pub password_hash: String,
    /// Access role.
    pub role: Role,
    /// The most recently issued session token, if any.
    pub last_token: Option<String>,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The client-facing projection of a [`User`].
///
/// Every user read in the API serializes through this type, so the password
/// hash is stripped uniformly - there is no response shape that can carry it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub fullname: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            fullname: user.fullname,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            fullname: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            password_hash: "$argon2id$not-a-real-hash".to_owned(),
            role: Role::User,
            last_token: Some("tok".to_owned()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_strips_secrets() {
        let profile = UserProfile::from(sample_user());
        let json = serde_json::to_value(&profile).unwrap();

        let object = json.as_object().unwrap();
        assert!(object.contains_key("email"));
        assert!(!object.contains_key("passwordHash"));
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("lastToken"));
    }

    #[test]
    fn test_profile_role_is_lowercase() {
        let profile = UserProfile::from(sample_user());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["role"], "user");
    }
}
