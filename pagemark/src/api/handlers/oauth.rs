//! OAuth initiation handlers.
//!
//! `POST /api/auth/{provider}/url` builds the provider authorization URL with
//! a signed state parameter and returns it as `{"url": ...}`. An unconfigured
//! provider answers 500 with `{"error": ...}` rather than constructing a
//! malformed URL.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, instrument};

use crate::{
    AppState,
    api::models::auth::{OauthUrlRequest, OauthUrlResponse},
    auth::oauth::{Provider, StateClaims, authorization_url},
    errors::Error,
};

/// Default post-login landing page when the client does not pass one.
const DEFAULT_REDIRECT: &str = "/dashboard";

fn initiate(provider: Provider, state: &AppState, payload: OauthUrlRequest) -> Response {
    let redirect = payload.redirect.unwrap_or_else(|| DEFAULT_REDIRECT.to_string());
    let claims = StateClaims::new(redirect, payload.connect);

    match authorization_url(provider, &claims, &state.config) {
        Ok(url) => Json(OauthUrlResponse { url: url.to_string() }).into_response(),
        Err(Error::Misconfigured { setting }) => {
            error!(provider = provider.as_str(), %setting, "OAuth initiation with missing credentials");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("{} sign-in is not configured", provider.as_str()) })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Start a Google sign-in.
#[utoipa::path(
    post,
    path = "/auth/google/url",
    request_body = OauthUrlRequest,
    responses(
        (status = 200, description = "Authorization URL", body = OauthUrlResponse),
        (status = 500, description = "Provider not configured"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn google_url(State(state): State<AppState>, Json(payload): Json<OauthUrlRequest>) -> Response {
    initiate(Provider::Google, &state, payload)
}

/// Start a Kakao sign-in.
#[utoipa::path(
    post,
    path = "/auth/kakao/url",
    request_body = OauthUrlRequest,
    responses(
        (status = 200, description = "Authorization URL", body = OauthUrlResponse),
        (status = 500, description = "Provider not configured"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn kakao_url(State(state): State<AppState>, Json(payload): Json<OauthUrlRequest>) -> Response {
    initiate(Provider::Kakao, &state, payload)
}
