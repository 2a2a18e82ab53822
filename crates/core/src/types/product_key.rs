//! Public product identifier.

use core::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProductKey`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ProductKeyError {
    /// The input is not exactly [`ProductKey::LENGTH`] characters.
    #[error("product key must be exactly {expected} characters, got {got}")]
    BadLength {
        /// Required length.
        expected: usize,
        /// Length of the rejected input.
        got: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9]`.
    #[error("product key must be alphanumeric")]
    BadCharacter,
}

/// Stable public identifier for a product.
///
/// Distinct from the database-assigned row id: cart lines reference products
/// by this key, which survives for the lifetime of the product and is safe to
/// expose to clients. Generated once at product creation and never
/// regenerated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ProductKey(String);

impl ProductKey {
    /// Fixed length of a product key.
    pub const LENGTH: usize = 30;

    /// Generate a fresh random key.
    ///
    /// 30 alphanumeric characters give ~178 bits of randomness; collisions
    /// are negligible at any realistic catalog size, and the store's unique
    /// constraint backstops them regardless.
    #[must_use]
    pub fn generate() -> Self {
        let key = rand::rng()
            .sample_iter(Alphanumeric)
            .take(Self::LENGTH)
            .map(char::from)
            .collect();
        Self(key)
    }

    /// Parse a `ProductKey` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly [`Self::LENGTH`]
    /// alphanumeric ASCII characters.
    pub fn parse(s: &str) -> Result<Self, ProductKeyError> {
        if s.len() != Self::LENGTH {
            return Err(ProductKeyError::BadLength {
                expected: Self::LENGTH,
                got: s.len(),
            });
        }

        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProductKeyError::BadCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductKey {
    type Err = ProductKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ProductKey {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProductKey {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ProductKey {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let key = ProductKey::generate();
        assert_eq!(key.as_str().len(), ProductKey::LENGTH);
        assert!(key.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_is_random() {
        // Two draws colliding would mean the RNG is broken.
        assert_ne!(ProductKey::generate(), ProductKey::generate());
    }

    #[test]
    fn test_parse_roundtrip() {
        let key = ProductKey::generate();
        let parsed = ProductKey::parse(key.as_str()).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert!(matches!(
            ProductKey::parse("short"),
            Err(ProductKeyError::BadLength { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_characters() {
        let bad = "!".repeat(ProductKey::LENGTH);
        assert!(matches!(
            ProductKey::parse(&bad),
            Err(ProductKeyError::BadCharacter)
        ));
    }
}
