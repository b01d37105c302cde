//! Database models for sponsors.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::api::models::sponsors::SponsorResponse;
use crate::types::SponsorId;

#[derive(Debug, Clone)]
pub struct SponsorCreateDBRequest {
    pub name: String,
    pub url: Option<String>,
    pub logo_url: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct SponsorDBResponse {
    pub id: SponsorId,
    pub name: String,
    pub url: Option<String>,
    pub logo_url: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl From<SponsorDBResponse> for SponsorResponse {
    fn from(s: SponsorDBResponse) -> Self {
        Self {
            id: s.id,
            name: s.name,
            url: s.url,
            logo_url: s.logo_url,
            position: s.position,
            created_at: s.created_at,
        }
    }
}
