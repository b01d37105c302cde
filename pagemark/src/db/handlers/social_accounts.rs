//! Database repository for linked social accounts.

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::{errors::Result, models::social_accounts::SocialAccountDBResponse};
use crate::types::{SocialAccountId, UserId, abbrev_uuid};

pub struct SocialAccounts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> SocialAccounts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(account_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: SocialAccountId) -> Result<Option<SocialAccountDBResponse>> {
        let row = sqlx::query_as::<_, SocialAccountDBResponse>("SELECT * FROM social_accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(row)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<SocialAccountDBResponse>> {
        let rows = sqlx::query_as::<_, SocialAccountDBResponse>(
            "SELECT * FROM social_accounts WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn count_for_user(&mut self, user_id: UserId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM social_accounts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Delete an account, scoped to its owner so one user cannot unlink
    /// another user's provider.
    #[instrument(skip(self), fields(account_id = %abbrev_uuid(&id), user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn delete_for_user(&mut self, id: SocialAccountId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM social_accounts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
