//! Database repository for FAQs.

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::faqs::{FaqCreateDBRequest, FaqDBResponse, FaqUpdateDBRequest},
};
use crate::types::{FaqId, abbrev_uuid};

/// Filter for listing FAQs.
#[derive(Debug, Clone, Default)]
pub struct FaqFilter {
    /// When true, only published entries are returned
    pub published_only: bool,
}

pub struct Faqs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Faqs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Faqs<'c> {
    type CreateRequest = FaqCreateDBRequest;
    type UpdateRequest = FaqUpdateDBRequest;
    type Response = FaqDBResponse;
    type Id = FaqId;
    type Filter = FaqFilter;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, FaqDBResponse>(
            r#"
            INSERT INTO faqs (id, question, answer, position, published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.question)
        .bind(&request.answer)
        .bind(request.position)
        .bind(request.published)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self), fields(faq_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, FaqDBResponse>("SELECT * FROM faqs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(row)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, FaqDBResponse>(
            "SELECT * FROM faqs WHERE (NOT $1 OR published) ORDER BY position, created_at",
        )
        .bind(filter.published_only)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self, request), fields(faq_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, FaqDBResponse>(
            r#"
            UPDATE faqs
            SET question = COALESCE($2, question),
                answer = COALESCE($3, answer),
                position = COALESCE($4, position),
                published = COALESCE($5, published),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.question)
        .bind(&request.answer)
        .bind(request.position)
        .bind(request.published)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(row)
    }

    #[instrument(skip(self), fields(faq_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }
}
