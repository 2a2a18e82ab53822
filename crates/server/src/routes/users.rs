//! User route handlers - registration and credential CRUD.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use bazaar_core::{Email, Role, UserId};

use crate::db::{UserRepository, users::UserChanges};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::UserProfile;
use crate::services::auth::{self, AuthService};
use crate::state::AppState;

/// Envelope for a single user.
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub success: bool,
    pub user: UserProfile,
}

/// Envelope for the user listing. The entity key stays singular (`user`),
/// matching the SPA contract.
#[derive(Debug, Serialize)]
pub struct UserListEnvelope {
    pub success: bool,
    pub user: Vec<UserProfile>,
}

/// Registration request body.
///
/// Fields are optional so missing input surfaces as a 400 envelope rather
/// than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub fullname: Option<String>,
}

/// Partial user update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// `GET /user` - list all users. Admin only; profiles carry no hashes.
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<UserListEnvelope>> {
    let users = UserRepository::new(state.pool()).list().await?;

    Ok(Json(UserListEnvelope {
        success: true,
        user: users.into_iter().map(UserProfile::from).collect(),
    }))
}

/// `POST /user` - register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<UserEnvelope>> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::Validation(
            "email and password are required".to_owned(),
        ));
    };
    let fullname = body.fullname.unwrap_or_default();

    let auth = AuthService::new(state.pool(), state.token_keys());
    let user = auth.register(&email, &password, &fullname).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(UserEnvelope {
        success: true,
        user: user.into(),
    }))
}

/// `GET /user/{id}` - fetch one user. Self or admin.
pub async fn show(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserEnvelope>> {
    if !session.can_act_for(id) {
        return Err(AppError::Forbidden("not your account".to_owned()));
    }

    let user = UserRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    Ok(Json(UserEnvelope {
        success: true,
        user: user.into(),
    }))
}

/// `PUT /user/{id}` - partial update. Self or admin; role changes admin-only.
///
/// A present password is re-hashed; an absent one is left untouched.
pub async fn update(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>> {
    if !session.can_act_for(id) {
        return Err(AppError::Forbidden("not your account".to_owned()));
    }
    if body.role.is_some() && !session.role.is_admin() {
        return Err(AppError::Forbidden(
            "only admins may change roles".to_owned(),
        ));
    }

    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(auth::AuthError::from)?;

    let password_hash = body
        .password
        .as_deref()
        .map(auth::hash_password)
        .transpose()?;

    let changes = UserChanges {
        fullname: body.fullname,
        email,
        password_hash,
        role: body.role,
    };

    let user = UserRepository::new(state.pool()).update(id, &changes).await?;

    Ok(Json(UserEnvelope {
        success: true,
        user: user.into(),
    }))
}

/// `DELETE /user/{id}` - delete an account. Self or admin.
///
/// The user's cart lines are removed with them.
pub async fn remove(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserEnvelope>> {
    if !session.can_act_for(id) {
        return Err(AppError::Forbidden("not your account".to_owned()));
    }

    let user = UserRepository::new(state.pool()).delete(id).await?;

    tracing::info!(user_id = %user.id, "user deleted");

    Ok(Json(UserEnvelope {
        success: true,
        user: user.into(),
    }))
}
