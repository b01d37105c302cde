//! Database models for subscriptions.

use chrono::{DateTime, Utc};

use crate::api::models::subscriptions::{SubscriptionResponse, SubscriptionStatus};
use crate::types::{SubscriptionId, TierId, UserId};

#[derive(Debug, Clone)]
pub struct SubscriptionUpsertDBRequest {
    pub user_id: UserId,
    pub tier_id: TierId,
    pub status: SubscriptionStatus,
    pub current_period_end: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SubscriptionDBResponse {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub tier_id: TierId,
    pub status: SubscriptionStatus,
    pub current_period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionDBResponse> for SubscriptionResponse {
    fn from(s: SubscriptionDBResponse) -> Self {
        Self {
            id: s.id,
            tier_id: s.tier_id,
            status: s.status,
            current_period_end: s.current_period_end,
            created_at: s.created_at,
        }
    }
}
