//! User-facing account models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::{Role, UserId};

/// The authenticated caller, as carried in the session token.
///
/// `username` and `display_name` are only populated when the value was built
/// from a database row rather than decoded from a token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = Uuid)]
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub display_name: Option<String>,
}

/// Public representation of a user account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = Uuid)]
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
