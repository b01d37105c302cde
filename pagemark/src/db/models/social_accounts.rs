//! Database models for linked social accounts.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::api::models::social_accounts::SocialAccountResponse;
use crate::types::{SocialAccountId, UserId};

#[derive(Debug, Clone, FromRow)]
pub struct SocialAccountDBResponse {
    pub id: SocialAccountId,
    pub user_id: UserId,
    pub provider: String,
    pub provider_user_id: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SocialAccountDBResponse> for SocialAccountResponse {
    fn from(a: SocialAccountDBResponse) -> Self {
        Self {
            id: a.id,
            provider: a.provider,
            email: a.email,
            created_at: a.created_at,
        }
    }
}
