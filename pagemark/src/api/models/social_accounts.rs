//! Linked social (OAuth) account models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::types::SocialAccountId;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SocialAccountResponse {
    #[schema(value_type = Uuid)]
    pub id: SocialAccountId,
    pub provider: String,
    /// Email reported by the provider, when it shared one
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}
