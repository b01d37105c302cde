//! Database models for FAQs.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::api::models::faqs::FaqResponse;
use crate::types::FaqId;

#[derive(Debug, Clone)]
pub struct FaqCreateDBRequest {
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FaqUpdateDBRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub position: Option<i32>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
pub struct FaqDBResponse {
    pub id: FaqId,
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FaqDBResponse> for FaqResponse {
    fn from(f: FaqDBResponse) -> Self {
        Self {
            id: f.id,
            question: f.question,
            answer: f.answer,
            position: f.position,
            published: f.published,
            updated_at: f.updated_at,
        }
    }
}
