//! Session route handlers - login, logout, and session resolution.

use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::{AUTH_COOKIE, removal_cookie, session_cookie};
use crate::models::UserProfile;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Envelope returned by login.
#[derive(Debug, Serialize)]
pub struct LoginEnvelope {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

/// Envelope carrying only a message.
#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

/// Envelope returned by session verification.
#[derive(Debug, Serialize)]
pub struct VerifyEnvelope {
    pub success: bool,
    pub token: String,
    pub user: UserProfile,
}

/// Envelope for the legacy lookup-by-token path.
#[derive(Debug, Serialize)]
pub struct TokenUserEnvelope {
    pub success: bool,
    pub user: UserProfile,
}

/// `POST /compare` - login.
///
/// On success the signed session token is set as the `authToken` cookie and
/// persisted onto the user record. A missing account is a 404 and a wrong
/// password a 401, per the API contract.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginEnvelope>)> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::Validation(
            "email and password are required".to_owned(),
        ));
    };

    let auth = AuthService::new(state.pool(), state.token_keys());
    let (user, token) = auth.login(&email, &password).await?;

    tracing::info!(user_id = %user.id, "login");

    let jar = jar.add(session_cookie(token));
    Ok((
        jar,
        Json(LoginEnvelope {
            success: true,
            message: "password matched".to_owned(),
            user: user.into(),
        }),
    ))
}

/// `GET /remove-cookie` - logout.
///
/// Clears the cookie only. The persisted `last_token` is left in place and
/// the token itself remains decodable until its horizon passes.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageEnvelope>) {
    let jar = jar.remove(removal_cookie());
    (
        jar,
        Json(MessageEnvelope {
            success: true,
            message: "logged out successfully".to_owned(),
        }),
    )
}

/// `GET /loginVerify` - resolve the current session.
///
/// Verifies the cookie token (signature + expiry) and loads the user it
/// points at; a token whose user is gone fails like any other bad token.
pub async fn verify(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<VerifyEnvelope>> {
    let token = jar
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or(AuthError::MissingToken)?;

    let auth = AuthService::new(state.pool(), state.token_keys());
    let (user, _claims) = auth.verify(&token).await?;

    Ok(Json(VerifyEnvelope {
        success: true,
        token,
        user: user.into(),
    }))
}

/// `GET /getuser/{token}` - resolve a user by raw token value.
///
/// Legacy path: matches the token against `last_token` on the user record.
/// The framework percent-decodes the path segment.
pub async fn user_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<TokenUserEnvelope>> {
    let user = UserRepository::new(state.pool())
        .get_by_token(&token)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    Ok(Json(TokenUserEnvelope {
        success: true,
        user: user.into(),
    }))
}
