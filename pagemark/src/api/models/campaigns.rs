//! Reading campaign models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::CampaignId;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CampaignResponse {
    #[schema(value_type = Uuid)]
    pub id: CampaignId,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Per-participant reading goal for the campaign period
    pub goal_books: i32,
    pub participant_count: i64,
    /// Total books finished by all participants
    pub books_finished: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CampaignCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub goal_books: i32,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CampaignUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub goal_books: Option<i32>,
}

/// A member's participation in a campaign.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipationResponse {
    #[schema(value_type = Uuid)]
    pub campaign_id: CampaignId,
    pub books_finished: i32,
    pub joined_at: DateTime<Utc>,
}

/// Body of `POST /api/campaigns/{id}/progress`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProgressUpdateRequest {
    pub books_finished: i32,
}
