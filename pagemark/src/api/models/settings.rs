//! Site settings and public stats models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettingResponse {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SettingUpsertRequest {
    pub value: String,
}

/// Public aggregate counters shown on the landing page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsResponse {
    pub members: i64,
    pub campaigns: i64,
    pub books_finished: i64,
}
