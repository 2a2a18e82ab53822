//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. `AppError` converts
//! all failures into the uniform `{success: false, message}` envelope - no
//! error crosses the API boundary unconverted. Server-side failures are
//! captured to Sentry before the response is built.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::catalog::CatalogError;
use crate::storage::StorageError;

/// Application-level error type for the API surface.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authenticated, but not permitted.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// State conflict (duplicate cart line, duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Blob store operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound => Self::NotFound("product not found".to_owned()),
            CatalogError::Repository(inner) => Self::Database(inner),
            CatalogError::Storage(inner) => Self::Storage(inner),
        }
    }
}

/// The uniform failure envelope.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl AppError {
    /// HTTP status this error maps to.
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) | AuthError::EmptyPassword => StatusCode::BAD_REQUEST,
                // Login preserves the user-not-found / bad-password
                // distinction the API contract promises.
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::TokenSigning | AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to put in the client-facing envelope.
    fn public_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Auth(err) => match err {
                AuthError::TokenSigning | AuthError::PasswordHash | AuthError::Repository(_) => {
                    "internal server error".to_owned()
                }
                other => other.to_string(),
            },
            Self::Database(err) => match err {
                RepositoryError::NotFound => "not found".to_owned(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    "internal server error".to_owned()
                }
            },
            Self::Storage(_) | Self::Internal(_) => "internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "request error"
            );
        }

        let body = ErrorBody {
            success: false,
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("bad input".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Forbidden("nope".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::NotFound("mug".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Conflict("already in cart".to_owned())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::MissingToken)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::TokenExpired)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::EmptyPassword)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_repository_status_codes() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "product already in cart".to_owned()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = AppError::Internal("connection string was postgres://user:pw@db".to_owned());
        assert_eq!(err.public_message(), "internal server error");
    }
}
