use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    jwt::{AuthUser, JwtKeys},
    password::{hash_password, verify_password},
};
use crate::{
    error::ApiError,
    resources::{users::non_empty, users::UserDraft, User},
    state::AppState,
    store::StoreError,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(payload) = payload?;
    let (Some(username), Some(email), Some(password)) = (
        non_empty(payload.username),
        non_empty(payload.email),
        non_empty(payload.password),
    ) else {
        return Err(ApiError::Validation(
            "Username, email and password are required".into(),
        ));
    };

    let existing = state
        .accounts
        .find(&|u: &User| u.username == username || u.email == email)
        .await?;
    if existing.is_some() {
        warn!(%username, %email, "user already exists");
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let hash = hash_password(&password).context("Registration failed")?;
    let user = state
        .accounts
        .create(UserDraft {
            username: Some(username),
            email: Some(email),
            password_hash: Some(hash),
        })
        .await?;

    let token = JwtKeys::from_ref(&state)
        .sign(user.id, &user.username)
        .context("Registration failed")?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(payload) = payload?;
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let Some(user) = state
        .accounts
        .find(&|u: &User| u.username == username)
        .await?
    else {
        warn!(%username, "login unknown username");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let Some(stored) = user.password_hash.as_deref() else {
        warn!(user_id = user.id, "login on account without password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&password, stored).context("Login failed")? {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let token = JwtKeys::from_ref(&state)
        .sign(user.id, &user.username)
        .context("Login failed")?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse { token, user }))
}

#[instrument(skip(state, claims))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<User>, ApiError> {
    match state.accounts.get(claims.user_id).await {
        Ok(user) => Ok(Json(user)),
        Err(StoreError::NotFound(_)) => {
            warn!(user_id = claims.user_id, "token for unknown account");
            Err(ApiError::Unauthorized("User not found".into()))
        }
        Err(e) => Err(e.into()),
    }
}
