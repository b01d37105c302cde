//! Database models for reading campaigns and participation.

use chrono::{DateTime, Utc};

use crate::api::models::campaigns::{CampaignResponse, ParticipationResponse};
use crate::types::{CampaignId, UserId};

#[derive(Debug, Clone)]
pub struct CampaignCreateDBRequest {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub goal_books: i32,
}

#[derive(Debug, Clone, Default)]
pub struct CampaignUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub goal_books: Option<i32>,
}

/// A campaign row joined with its participation aggregates.
#[derive(Debug, Clone)]
pub struct CampaignDBResponse {
    pub id: CampaignId,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub goal_books: i32,
    pub participant_count: i64,
    pub books_finished: i64,
    pub created_at: DateTime<Utc>,
}

impl From<CampaignDBResponse> for CampaignResponse {
    fn from(c: CampaignDBResponse) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            starts_at: c.starts_at,
            ends_at: c.ends_at,
            goal_books: c.goal_books,
            participant_count: c.participant_count,
            books_finished: c.books_finished,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParticipationDBResponse {
    pub campaign_id: CampaignId,
    pub user_id: UserId,
    pub books_finished: i32,
    pub joined_at: DateTime<Utc>,
}

impl From<ParticipationDBResponse> for ParticipationResponse {
    fn from(p: ParticipationDBResponse) -> Self {
        Self {
            campaign_id: p.campaign_id,
            books_finished: p.books_finished,
            joined_at: p.joined_at,
        }
    }
}
