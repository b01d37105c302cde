//! Database models for site settings.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::api::models::settings::SettingResponse;

#[derive(Debug, Clone, FromRow)]
pub struct SettingDBResponse {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl From<SettingDBResponse> for SettingResponse {
    fn from(s: SettingDBResponse) -> Self {
        Self {
            key: s.key,
            value: s.value,
            updated_at: s.updated_at,
        }
    }
}
