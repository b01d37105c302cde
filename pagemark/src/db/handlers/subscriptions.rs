//! Database repository for subscriptions.
//!
//! One subscription per user (enforced by a unique index), so the write path
//! is an upsert keyed on the user rather than trait-shaped CRUD.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

use crate::api::models::subscriptions::SubscriptionStatus;
use crate::db::{
    errors::{DbError, Result},
    models::subscriptions::{SubscriptionDBResponse, SubscriptionUpsertDBRequest},
};
use crate::types::{SubscriptionId, UserId, abbrev_uuid};

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    id: SubscriptionId,
    user_id: UserId,
    tier_id: Uuid,
    status: String,
    current_period_end: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for SubscriptionDBResponse {
    type Error = DbError;

    fn try_from(row: SubscriptionRow) -> Result<Self> {
        let status = row.status.parse().map_err(|e: String| DbError::Other(anyhow::anyhow!(e)))?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            tier_id: row.tier_id,
            status,
            current_period_end: row.current_period_end,
            created_at: row.created_at,
        })
    }
}

pub struct Subscriptions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Subscriptions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get_for_user(&mut self, user_id: UserId) -> Result<Option<SubscriptionDBResponse>> {
        let row = sqlx::query_as::<_, SubscriptionRow>("SELECT * FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *self.db)
            .await?;

        row.map(SubscriptionDBResponse::try_from).transpose()
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    pub async fn upsert(&mut self, request: &SubscriptionUpsertDBRequest) -> Result<SubscriptionDBResponse> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (id, user_id, tier_id, status, current_period_end)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET tier_id = EXCLUDED.tier_id,
                status = EXCLUDED.status,
                current_period_end = EXCLUDED.current_period_end,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.tier_id)
        .bind(request.status.as_str())
        .bind(request.current_period_end)
        .fetch_one(&mut *self.db)
        .await?;

        row.try_into()
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn cancel(&mut self, user_id: UserId) -> Result<SubscriptionDBResponse> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            "UPDATE subscriptions SET status = $2, updated_at = now() WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(SubscriptionStatus::Canceled.as_str())
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        row.try_into()
    }
}
