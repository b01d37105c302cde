//! Authentication request/response models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/auth/{provider}/url`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OauthUrlRequest {
    /// Where to send the browser after a successful login
    pub redirect: Option<String>,
    /// Attach the provider to the signed-in account instead of signing in
    #[serde(default)]
    pub connect: bool,
}

/// Successful OAuth initiation: the provider authorization URL to navigate to.
#[derive(Debug, Serialize, ToSchema)]
pub struct OauthUrlResponse {
    pub url: String,
}
