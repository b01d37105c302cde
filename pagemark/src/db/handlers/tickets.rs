//! Database repository for support tickets.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

use crate::api::models::tickets::TicketStatus;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::tickets::{TicketCreateDBRequest, TicketDBResponse},
};
use crate::types::{TicketId, UserId, abbrev_uuid};

/// Filter for listing tickets. Members list their own; staff list everything.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub user_id: Option<UserId>,
    pub status: Option<TicketStatus>,
}

#[derive(Debug, FromRow)]
struct TicketRow {
    id: TicketId,
    user_id: UserId,
    subject: String,
    body: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for TicketDBResponse {
    type Error = DbError;

    fn try_from(row: TicketRow) -> Result<Self> {
        let status = row.status.parse().map_err(|e: String| DbError::Other(anyhow::anyhow!(e)))?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            subject: row.subject,
            body: row.body,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct Tickets<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Tickets<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Tickets<'c> {
    type CreateRequest = TicketCreateDBRequest;
    type UpdateRequest = TicketStatus;
    type Response = TicketDBResponse;
    type Id = TicketId;
    type Filter = TicketFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            INSERT INTO tickets (id, user_id, subject, body)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.subject)
        .bind(&request.body)
        .fetch_one(&mut *self.db)
        .await?;

        row.try_into()
    }

    #[instrument(skip(self), fields(ticket_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, TicketRow>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        row.map(TicketDBResponse::try_from).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT * FROM tickets
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&mut *self.db)
        .await?;

        rows.into_iter().map(TicketDBResponse::try_from).collect()
    }

    #[instrument(skip(self), fields(ticket_id = %abbrev_uuid(&id), status = %request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, TicketRow>(
            "UPDATE tickets SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(request.as_str())
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        row.try_into()
    }

    #[instrument(skip(self), fields(ticket_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }
}
