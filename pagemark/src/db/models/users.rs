//! Database models for users.

use chrono::{DateTime, Utc};

use crate::api::models::users::{CurrentUser, UserResponse};
use crate::types::{Role, UserId};

#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Role,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub display_name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            display_name: user.display_name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
            display_name: user.display_name,
        }
    }
}
