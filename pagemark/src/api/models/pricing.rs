//! Pricing tier models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::TierId;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PricingTierResponse {
    #[schema(value_type = Uuid)]
    pub id: TierId,
    pub name: String,
    pub description: Option<String>,
    /// Price in the smallest currency unit (e.g. cents, won)
    pub price_cents: i64,
    pub currency: String,
    /// Billing interval: "month" or "year"
    pub interval: String,
    pub features: Vec<String>,
    pub position: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PricingTierCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub interval: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub position: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PricingTierUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub interval: Option<String>,
    pub features: Option<Vec<String>>,
    pub position: Option<i32>,
    pub active: Option<bool>,
}
