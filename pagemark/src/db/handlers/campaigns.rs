//! Database repository for reading campaigns and participation.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::campaigns::{CampaignCreateDBRequest, CampaignDBResponse, CampaignUpdateDBRequest, ParticipationDBResponse},
};
use crate::types::{CampaignId, UserId, abbrev_uuid};

/// Filter for listing campaigns.
#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    /// When set, only campaigns whose date range covers this instant
    pub active_on: Option<DateTime<Utc>>,
}

impl CampaignFilter {
    pub fn active_now() -> Self {
        Self {
            active_on: Some(Utc::now()),
        }
    }
}

#[derive(Debug, FromRow)]
struct CampaignRow {
    id: CampaignId,
    title: String,
    description: Option<String>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    goal_books: i32,
    participant_count: i64,
    books_finished: i64,
    created_at: DateTime<Utc>,
}

impl From<CampaignRow> for CampaignDBResponse {
    fn from(row: CampaignRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            goal_books: row.goal_books,
            participant_count: row.participant_count,
            books_finished: row.books_finished,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ParticipationRow {
    campaign_id: CampaignId,
    user_id: UserId,
    books_finished: i32,
    joined_at: DateTime<Utc>,
}

impl From<ParticipationRow> for ParticipationDBResponse {
    fn from(row: ParticipationRow) -> Self {
        Self {
            campaign_id: row.campaign_id,
            user_id: row.user_id,
            books_finished: row.books_finished,
            joined_at: row.joined_at,
        }
    }
}

// Campaign rows are always fetched joined with their participation aggregates
const CAMPAIGN_SELECT: &str = r#"
    SELECT c.id, c.title, c.description, c.starts_at, c.ends_at, c.goal_books, c.created_at,
           COUNT(p.user_id) AS participant_count,
           COALESCE(SUM(p.books_finished), 0)::BIGINT AS books_finished
    FROM campaigns c
    LEFT JOIN campaign_participants p ON p.campaign_id = c.id
"#;

pub struct Campaigns<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Campaigns<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Enroll a user in a campaign. A second join surfaces as a unique
    /// constraint violation.
    #[instrument(skip(self), fields(campaign_id = %abbrev_uuid(&campaign_id), user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn join(&mut self, campaign_id: CampaignId, user_id: UserId) -> Result<ParticipationDBResponse> {
        let row = sqlx::query_as::<_, ParticipationRow>(
            "INSERT INTO campaign_participants (campaign_id, user_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(campaign_id)
        .bind(user_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(campaign_id = %abbrev_uuid(&campaign_id), user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get_participation(&mut self, campaign_id: CampaignId, user_id: UserId) -> Result<Option<ParticipationDBResponse>> {
        let row = sqlx::query_as::<_, ParticipationRow>(
            "SELECT * FROM campaign_participants WHERE campaign_id = $1 AND user_id = $2",
        )
        .bind(campaign_id)
        .bind(user_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), fields(campaign_id = %abbrev_uuid(&campaign_id), user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn update_progress(
        &mut self,
        campaign_id: CampaignId,
        user_id: UserId,
        books_finished: i32,
    ) -> Result<ParticipationDBResponse> {
        let row = sqlx::query_as::<_, ParticipationRow>(
            "UPDATE campaign_participants SET books_finished = $3 WHERE campaign_id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(campaign_id)
        .bind(user_id)
        .bind(books_finished)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(row.into())
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM campaigns").fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    /// Books finished across all campaigns, for the public stats endpoint.
    #[instrument(skip(self), err)]
    pub async fn total_books_finished(&mut self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(books_finished), 0)::BIGINT FROM campaign_participants")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(total)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Campaigns<'c> {
    type CreateRequest = CampaignCreateDBRequest;
    type UpdateRequest = CampaignUpdateDBRequest;
    type Response = CampaignDBResponse;
    type Id = CampaignId;
    type Filter = CampaignFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id: CampaignId = sqlx::query_scalar(
            r#"
            INSERT INTO campaigns (id, title, description, starts_at, ends_at, goal_books)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.goal_books)
        .fetch_one(&mut *self.db)
        .await?;

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(campaign_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let query = format!("{CAMPAIGN_SELECT} WHERE c.id = $1 GROUP BY c.id");
        let row = sqlx::query_as::<_, CampaignRow>(&query).bind(id).fetch_optional(&mut *self.db).await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let query = format!(
            r#"
            {CAMPAIGN_SELECT}
            WHERE ($1::timestamptz IS NULL OR (c.starts_at <= $1 AND c.ends_at >= $1))
            GROUP BY c.id
            ORDER BY c.starts_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, CampaignRow>(&query)
            .bind(filter.active_on)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, request), fields(campaign_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let updated = sqlx::query(
            r#"
            UPDATE campaigns
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                starts_at = COALESCE($4, starts_at),
                ends_at = COALESCE($5, ends_at),
                goal_books = COALESCE($6, goal_books),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.goal_books)
        .execute(&mut *self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(campaign_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_user;
    use chrono::Duration;
    use sqlx::PgPool;

    async fn seed_campaign(pool: &PgPool) -> CampaignDBResponse {
        let mut conn = pool.acquire().await.unwrap();
        Campaigns::new(&mut conn)
            .create(&CampaignCreateDBRequest {
                title: "Summer Reading".to_string(),
                description: Some("Read through the heat".to_string()),
                starts_at: Utc::now() - Duration::days(1),
                ends_at: Utc::now() + Duration::days(30),
                goal_books: 5,
            })
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_join_then_read_participation(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", None).await;
        let campaign = seed_campaign(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Campaigns::new(&mut conn);

        let joined = repo.join(campaign.id, user.id).await.unwrap();
        assert_eq!(joined.books_finished, 0);

        let participation = repo.get_participation(campaign.id, user.id).await.unwrap().unwrap();
        assert_eq!(participation.campaign_id, campaign.id);
        assert_eq!(participation.user_id, user.id);

        // Aggregates on the campaign row reflect the new participant
        let campaign = repo.get_by_id(campaign.id).await.unwrap().unwrap();
        assert_eq!(campaign.participant_count, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_joining_twice_is_a_unique_violation(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", None).await;
        let campaign = seed_campaign(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Campaigns::new(&mut conn);
        repo.join(campaign.id, user.id).await.unwrap();

        let second = repo.join(campaign.id, user.id).await;
        assert!(matches!(
            second.unwrap_err(),
            DbError::UniqueViolation { table: Some(t), .. } if t == "campaign_participants"
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_progress_requires_participation(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", None).await;
        let campaign = seed_campaign(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Campaigns::new(&mut conn);

        assert!(matches!(
            repo.update_progress(campaign.id, user.id, 2).await.unwrap_err(),
            DbError::NotFound
        ));

        repo.join(campaign.id, user.id).await.unwrap();
        let updated = repo.update_progress(campaign.id, user.id, 2).await.unwrap();
        assert_eq!(updated.books_finished, 2);

        assert_eq!(repo.total_books_finished().await.unwrap(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_participation_is_absent_before_joining(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", None).await;
        let campaign = seed_campaign(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let participation = Campaigns::new(&mut conn).get_participation(campaign.id, user.id).await.unwrap();
        assert!(participation.is_none());
    }
}
