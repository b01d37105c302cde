//! Database models for pricing tiers.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::api::models::pricing::PricingTierResponse;
use crate::types::TierId;

#[derive(Debug, Clone)]
pub struct PricingTierCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub interval: String,
    pub features: Vec<String>,
    pub position: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PricingTierUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub interval: Option<String>,
    pub features: Option<Vec<String>>,
    pub position: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PricingTierDBResponse {
    pub id: TierId,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    /// Column is `billing_interval`; `interval` is a type keyword in Postgres
    #[sqlx(rename = "billing_interval")]
    pub interval: String,
    pub features: Vec<String>,
    pub position: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PricingTierDBResponse> for PricingTierResponse {
    fn from(t: PricingTierDBResponse) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            price_cents: t.price_cents,
            currency: t.currency,
            interval: t.interval,
            features: t.features,
            position: t.position,
            active: t.active,
            created_at: t.created_at,
        }
    }
}
