//! User repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bazaar_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::User;

/// Raw row shape; validated into [`User`] on the way out.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    fullname: String,
    email: String,
    password_hash: String,
    role: String,
    last_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: Role = self.role.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            fullname: self.fullname,
            email,
            password_hash: self.password_hash,
            role,
            last_token: self.last_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Partial update for a user. `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub fullname: Option<String>,
    pub email: Option<Email>,
    /// Already-hashed replacement password.
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, fullname, email, password_hash, role, last_token, created_at, updated_at
            FROM users
            ORDER BY created_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, fullname, email, password_hash, role, last_token, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, fullname, email, password_hash, role, last_token, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by the last session token issued to them.
    ///
    /// Legacy lookup path: matches the raw token value persisted at login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, fullname, email, password_hash, role, last_token, created_at, updated_at
            FROM users
            WHERE last_token = $1
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user with the default `user` role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        fullname: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (fullname, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, fullname, email, password_hash, role, last_token, created_at, updated_at
            ",
        )
        .bind(fullname)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_user()
    }

    /// Apply a partial update to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET fullname      = COALESCE($2, fullname),
                email         = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role          = COALESCE($5, role),
                updated_at    = now()
            WHERE id = $1
            RETURNING id, fullname, email, password_hash, role, last_token, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(changes.fullname.as_deref())
        .bind(changes.email.as_ref())
        .bind(changes.password_hash.as_deref())
        .bind(changes.role.map(Role::as_str))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.ok_or(RepositoryError::NotFound)?.into_user()
    }

    /// Record the session token issued at login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_last_token(&self, id: UserId, token: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET last_token = $2
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(token)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a user, returning the removed record.
    ///
    /// Cart lines owned by the user go with them (`ON DELETE CASCADE`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: UserId) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            DELETE FROM users
            WHERE id = $1
            RETURNING id, fullname, email, password_hash, role, last_token, created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_user()
    }
}
