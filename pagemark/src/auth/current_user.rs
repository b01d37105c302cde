//! Extractor for the authenticated user in API handlers.
//!
//! The gate has already decided whether the route is reachable; this extractor
//! exists for handlers that need to know WHO is calling (e.g. `/api/auth/me`,
//! ticket creation). It re-verifies the access-token cookie rather than
//! trusting request extensions, so it is safe on routes the gate left public.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session::{self, TokenKind},
    errors::Error,
};

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookie_header = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::Unauthenticated { message: None })?;

        let token = session::cookie_value(cookie_header, &state.config.auth.session.cookie_name)
            .ok_or(Error::Unauthenticated { message: None })?;

        session::verify_session_token(token, TokenKind::Access, &state.config)
    }
}

/// Extractor that requires an admin session. Used by admin CRUD handlers as a
/// second line of defense behind the gate's route table.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.satisfies(crate::types::Role::Admin) {
            return Err(Error::InsufficientRole {
                required: crate::types::Role::Admin,
                resource: parts.uri.path().to_string(),
            });
        }
        Ok(AdminUser(user))
    }
}
