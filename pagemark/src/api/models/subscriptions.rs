//! Subscription models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::types::{SubscriptionId, TierId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::PastDue => "past_due",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            other => Err(format!("unknown subscription status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    #[schema(value_type = Uuid)]
    pub id: SubscriptionId,
    #[schema(value_type = Uuid)]
    pub tier_id: TierId,
    pub status: SubscriptionStatus,
    pub current_period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/subscriptions/checkout`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[schema(value_type = Uuid)]
    pub tier_id: TierId,
}

/// Checkout handoff: the URL the browser should navigate to.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}
