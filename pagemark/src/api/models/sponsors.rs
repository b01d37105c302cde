//! Sponsor models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::SponsorId;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SponsorResponse {
    #[schema(value_type = Uuid)]
    pub id: SponsorId,
    pub name: String,
    pub url: Option<String>,
    pub logo_url: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SponsorCreateRequest {
    pub name: String,
    pub url: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub position: i32,
}
