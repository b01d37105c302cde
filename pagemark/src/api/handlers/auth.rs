//! Password authentication handlers: register, login, logout, refresh, me.

use axum::{
    Json,
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
};
use tokio::task::spawn_blocking;
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        auth::{LoginRequest, RegisterRequest},
        users::{CurrentUser, UserResponse},
    },
    auth::{
        password::{hash_password, verify_password},
        session::{self, TokenKind},
    },
    db::{
        errors::DbError,
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
    errors::{Error, Result},
    types::Role,
};

type SessionCookies = AppendHeaders<[(axum::http::HeaderName, String); 2]>;

/// Mint the access/refresh cookie pair for a freshly authenticated user.
fn session_cookies(user: &CurrentUser, state: &AppState) -> Result<SessionCookies> {
    let session_config = &state.config.auth.session;
    let access = session::create_session_token(user, TokenKind::Access, &state.config)?;
    let refresh = session::create_session_token(user, TokenKind::Refresh, &state.config)?;

    Ok(AppendHeaders([
        (
            SET_COOKIE,
            session::session_cookie(
                &session_config.cookie_name,
                &access,
                session_config.access_ttl.as_secs(),
                session_config.cookie_secure,
            ),
        ),
        (
            SET_COOKIE,
            session::session_cookie(
                &session_config.refresh_cookie_name,
                &refresh,
                session_config.refresh_ttl.as_secs(),
                session_config.cookie_secure,
            ),
        ),
    ]))
}

fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    }
}

/// Create a new account with email and password.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created and signed in", body = ApiResponse<UserResponse>),
        (status = 400, description = "Registration disabled or invalid input"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(State(state): State<AppState>, Json(payload): Json<RegisterRequest>) -> Result<impl IntoResponse> {
    if !state.config.auth.registration_enabled {
        return Err(Error::BadRequest {
            message: "Registration is currently disabled".to_string(),
        });
    }

    let password_config = &state.config.auth.password;
    if payload.password.len() < password_config.min_length || payload.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!(
                "Password must be between {} and {} characters",
                password_config.min_length, password_config.max_length
            ),
        });
    }

    // Hashing is CPU-bound, keep it off the async runtime
    let password = payload.password.clone();
    let hash_config = password_config.clone();
    let password_hash = spawn_blocking(move || hash_password(&password, &hash_config))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password hashing task: {e}"),
        })??;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            email: payload.email,
            username: payload.username,
            display_name: payload.display_name,
            password_hash: Some(password_hash),
            role: Role::Member,
        })
        .await?;

    let current = CurrentUser::from(user.clone());
    let cookies = session_cookies(&current, &state)?;
    Ok((cookies, Json(ApiResponse::new(UserResponse::from(user)))))
}

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<UserResponse>),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> Result<impl IntoResponse> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn)
        .get_by_email(&payload.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    // OAuth-only accounts have no password to check against
    let hash = user.password_hash.clone().ok_or_else(invalid_credentials)?;

    let password = payload.password;
    let verified = spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password verification task: {e}"),
        })??;

    if !verified {
        return Err(invalid_credentials());
    }

    let current = CurrentUser::from(user.clone());
    let cookies = session_cookies(&current, &state)?;
    Ok((cookies, Json(ApiResponse::new(UserResponse::from(user)))))
}

/// Sign out by expiring both session cookies.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Signed out")),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let session_config = &state.config.auth.session;
    let cookies = AppendHeaders([
        (
            SET_COOKIE,
            session::clear_cookie(&session_config.cookie_name, session_config.cookie_secure),
        ),
        (
            SET_COOKIE,
            session::clear_cookie(&session_config.refresh_cookie_name, session_config.cookie_secure),
        ),
    ]);

    (cookies, Json(ApiResponse::new(serde_json::json!({}))))
}

/// Exchange a valid refresh token for a fresh cookie pair.
///
/// The user row is re-read so a deleted account cannot keep refreshing; the
/// role in the new tokens reflects the database, not the old token.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New session issued", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid refresh token"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, headers))]
pub async fn refresh(State(state): State<AppState>, headers: axum::http::HeaderMap) -> Result<impl IntoResponse> {
    let cookie_header = headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(Error::Unauthenticated { message: None })?;

    let token = session::cookie_value(cookie_header, &state.config.auth.session.refresh_cookie_name)
        .ok_or(Error::Unauthenticated { message: None })?;

    let claims_user = session::verify_session_token(token, TokenKind::Refresh, &state.config)?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user: UserDBResponse = Users::new(&mut conn)
        .get_by_id(claims_user.id)
        .await?
        .ok_or(Error::Unauthenticated { message: None })?;

    let current = CurrentUser::from(user.clone());
    let cookies = session_cookies(&current, &state)?;
    Ok((cookies, Json(ApiResponse::new(UserResponse::from(user)))))
}

/// The signed-in user's account, read fresh from the database.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current account", body = ApiResponse<UserResponse>),
        (status = 401, description = "Not signed in"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, current))]
pub async fn me(State(state): State<AppState>, current: CurrentUser) -> Result<Json<ApiResponse<UserResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn).get_by_id(current.id).await?.ok_or(Error::NotFound {
        resource: "User".to_string(),
        id: current.id.to_string(),
    })?;

    Ok(Json(ApiResponse::new(UserResponse::from(user))))
}
