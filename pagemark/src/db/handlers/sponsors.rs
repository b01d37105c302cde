//! Database repository for sponsors.

use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::db::{
    errors::Result,
    models::sponsors::{SponsorCreateDBRequest, SponsorDBResponse},
};
use crate::types::{SponsorId, abbrev_uuid};

pub struct Sponsors<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Sponsors<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn create(&mut self, request: &SponsorCreateDBRequest) -> Result<SponsorDBResponse> {
        let row = sqlx::query_as::<_, SponsorDBResponse>(
            r#"
            INSERT INTO sponsors (id, name, url, logo_url, position)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.url)
        .bind(&request.logo_url)
        .bind(request.position)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self), err)]
    pub async fn list(&mut self) -> Result<Vec<SponsorDBResponse>> {
        let rows = sqlx::query_as::<_, SponsorDBResponse>("SELECT * FROM sponsors ORDER BY position, created_at")
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(sponsor_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: SponsorId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sponsors WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }
}
