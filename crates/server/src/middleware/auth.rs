//! Authentication extractors.
//!
//! All authorization happens here, server-side, against the signed session
//! token - the client's idea of who it is (or what role it has) is never
//! trusted. Handlers take [`RequireAuth`] or [`RequireAdmin`] as an argument
//! and get a verified [`SessionUser`] or a rejection envelope.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use bazaar_core::{Role, UserId};

use crate::error::AppError;
use crate::services::auth::{AuthError, Claims, token};
use crate::state::AppState;

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "authToken";

/// Verified identity of the requesting session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl SessionUser {
    /// Whether this session may act on resources owned by `owner`.
    ///
    /// Admins may act on anyone's resources; everyone else only on their own.
    #[must_use]
    pub fn can_act_for(&self, owner: UserId) -> bool {
        self.role.is_admin() || self.id == owner
    }
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: UserId::new(claims.sub),
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Extractor that requires a valid session.
///
/// Rejects with a 401 envelope when the cookie is missing, the signature is
/// bad, or the token is past its horizon (expiry is detected lazily here -
/// there is no server-side revocation).
///
/// ```rust,ignore
/// async fn handler(RequireAuth(session): RequireAuth) -> impl IntoResponse {
///     format!("hello, {}", session.email)
/// }
/// ```
pub struct RequireAuth(pub SessionUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_cookie(parts, state)?;
        Ok(Self(claims.into()))
    }
}

/// Extractor that requires a valid session with the admin role.
///
/// Rejects with 401 when unauthenticated and 403 when authenticated without
/// admin access. The role comes from the signed claims, so a demotion takes
/// effect when the current token expires.
pub struct RequireAdmin(pub SessionUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session: SessionUser = claims_from_cookie(parts, state)?.into();

        if !session.role.is_admin() {
            return Err(AppError::Forbidden("admin access required".to_owned()));
        }

        Ok(Self(session))
    }
}

/// Pull the session cookie off the request and verify it.
fn claims_from_cookie(parts: &Parts, state: &AppState) -> Result<Claims, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar.get(AUTH_COOKIE).ok_or(AuthError::MissingToken)?;
    let claims = token::verify(state.token_keys(), cookie.value())?;
    Ok(claims)
}

/// Build the session cookie set at login.
///
/// HTTP-only and cross-site-capable (`SameSite=None; Secure`) so the SPA can
/// send it from its own origin; max-age matches the token's validity horizon.
#[must_use]
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::days(token::SESSION_TTL_DAYS))
        .build()
}

/// Build the cookie used to clear the session at logout.
///
/// Clearing the cookie is all logout does: the persisted `last_token` stays
/// on the user record and the token itself remains decodable until expiry.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE).path("/").build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;
    use bazaar_core::Email;
    use chrono::Utc;
    use secrecy::SecretString;
    use std::path::PathBuf;

    use crate::config::ServerConfig;
    use crate::models::User;

    fn test_state() -> AppState {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/bazaar_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 4000,
            session_secret: SecretString::from("0Jq6VxMwN3kYtR8pZcDf2HsLbA5eGuW7"),
            allowed_origin: "http://localhost:5173".to_owned(),
            upload_dir: PathBuf::from("uploads"),
            sentry_dsn: None,
        };
        // connect_lazy defers any actual connection; these tests never hit it.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/bazaar_test")
            .unwrap();
        AppState::new(config, pool)
    }

    fn token_for(state: &AppState, role: Role) -> String {
        let user = User {
            id: UserId::new(5),
            fullname: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            password_hash: "hash".to_owned(),
            role,
            last_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        token::issue(state.token_keys(), &user).unwrap()
    }

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/carts");
        if let Some(value) = cookie {
            builder = builder.header("cookie", value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_missing_cookie_rejected() {
        let state = test_state();
        let mut parts = parts_with_cookie(None);

        let result = RequireAuth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::MissingToken))
        ));
    }

    #[tokio::test]
    async fn test_valid_cookie_accepted() {
        let state = test_state();
        let token = token_for(&state, Role::User);
        let mut parts = parts_with_cookie(Some(&format!("{AUTH_COOKIE}={token}")));

        let RequireAuth(session) = RequireAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(session.id, UserId::new(5));
        assert_eq!(session.email, "ada@example.com");
        assert_eq!(session.role, Role::User);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let state = test_state();
        let mut parts = parts_with_cookie(Some(&format!("{AUTH_COOKIE}=not-a-token")));

        let result = RequireAuth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::InvalidToken))
        ));
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let state = test_state();

        let token = token_for(&state, Role::User);
        let mut parts = parts_with_cookie(Some(&format!("{AUTH_COOKIE}={token}")));
        let result = RequireAdmin::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let token = token_for(&state, Role::Admin);
        let mut parts = parts_with_cookie(Some(&format!("{AUTH_COOKIE}={token}")));
        let RequireAdmin(session) = RequireAdmin::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(session.role.is_admin());
    }

    #[test]
    fn test_can_act_for() {
        let session = SessionUser {
            id: UserId::new(1),
            email: "a@b.c".to_owned(),
            role: Role::User,
        };
        assert!(session.can_act_for(UserId::new(1)));
        assert!(!session.can_act_for(UserId::new(2)));

        let admin = SessionUser {
            id: UserId::new(9),
            email: "root@b.c".to_owned(),
            role: Role::Admin,
        };
        assert!(admin.can_act_for(UserId::new(2)));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok".to_owned());
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }
}
