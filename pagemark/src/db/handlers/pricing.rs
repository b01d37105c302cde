//! Database repository for pricing tiers.

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::pricing::{PricingTierCreateDBRequest, PricingTierDBResponse, PricingTierUpdateDBRequest},
};
use crate::types::{TierId, abbrev_uuid};

/// Filter for listing pricing tiers.
#[derive(Debug, Clone, Default)]
pub struct PricingTierFilter {
    /// When true, only active tiers are returned
    pub active_only: bool,
}

pub struct PricingTiers<'c> {
    db: &'c mut PgConnection,
}

impl<'c> PricingTiers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for PricingTiers<'c> {
    type CreateRequest = PricingTierCreateDBRequest;
    type UpdateRequest = PricingTierUpdateDBRequest;
    type Response = PricingTierDBResponse;
    type Id = TierId;
    type Filter = PricingTierFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, PricingTierDBResponse>(
            r#"
            INSERT INTO pricing_tiers (id, name, description, price_cents, currency, billing_interval, features, position, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price_cents)
        .bind(&request.currency)
        .bind(&request.interval)
        .bind(&request.features)
        .bind(request.position)
        .bind(request.active)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self), fields(tier_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, PricingTierDBResponse>("SELECT * FROM pricing_tiers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(row)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, PricingTierDBResponse>(
            "SELECT * FROM pricing_tiers WHERE (NOT $1 OR active) ORDER BY position, created_at",
        )
        .bind(filter.active_only)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self, request), fields(tier_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, PricingTierDBResponse>(
            r#"
            UPDATE pricing_tiers
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price_cents = COALESCE($4, price_cents),
                currency = COALESCE($5, currency),
                billing_interval = COALESCE($6, billing_interval),
                features = COALESCE($7, features),
                position = COALESCE($8, position),
                active = COALESCE($9, active),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price_cents)
        .bind(&request.currency)
        .bind(&request.interval)
        .bind(&request.features)
        .bind(request.position)
        .bind(request.active)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(row)
    }

    #[instrument(skip(self), fields(tier_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pricing_tiers WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }
}
