//! FAQ models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::FaqId;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FaqResponse {
    #[schema(value_type = Uuid)]
    pub id: FaqId,
    pub question: String,
    pub answer: String,
    /// Display ordering; lower positions render first
    pub position: i32,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FaqCreateRequest {
    pub question: String,
    pub answer: String,
    pub position: i32,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FaqUpdateRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub position: Option<i32>,
    pub published: Option<bool>,
}
