//! Database repository for users.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::{UserId, abbrev_uuid};

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

// Raw row; the role column is text and parsed on the way out so unknown
// role strings surface as errors instead of being silently accepted.
#[derive(Debug, FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    username: String,
    display_name: Option<String>,
    role: String,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserDBResponse {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = row.role.parse().map_err(|e: String| DbError::Other(anyhow::anyhow!(e)))?;
        Ok(Self {
            id: row.id,
            email: row.email,
            username: row.username,
            display_name: row.display_name,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        row.map(UserDBResponse::try_from).transpose()
    }

    /// Total number of registered accounts, for the public stats endpoint.
    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&mut *self.db).await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, username, display_name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.email)
        .bind(&request.username)
        .bind(&request.display_name)
        .bind(&request.password_hash)
        .bind(request.role.as_str())
        .fetch_one(&mut *self.db)
        .await?;

        row.try_into()
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        row.map(UserDBResponse::try_from).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at OFFSET $1 LIMIT $2")
            .bind(filter.skip)
            .bind(filter.limit)
            .fetch_all(&mut *self.db)
            .await?;

        rows.into_iter().map(UserDBResponse::try_from).collect()
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                password_hash = COALESCE($3, password_hash),
                role = COALESCE($4, role),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.display_name)
        .bind(&request.password_hash)
        .bind(request.role.map(|r| r.as_str()))
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        row.try_into()
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use sqlx::PgPool;

    fn request(email: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            email: email.to_string(),
            username: email.split('@').next().unwrap().to_string(),
            display_name: None,
            password_hash: None,
            role: Role::Member,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_fetch_by_email(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&request("reader@example.com")).await.unwrap();
        assert_eq!(created.role, Role::Member);
        assert!(created.password_hash.is_none());

        let fetched = repo.get_by_email("reader@example.com").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_is_a_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);
        repo.create(&request("reader@example.com")).await.unwrap();

        let mut second = request("reader@example.com");
        second.username = "other_username".to_string();
        assert!(matches!(
            repo.create(&second).await.unwrap_err(),
            DbError::UniqueViolation { table: Some(t), .. } if t == "users"
        ));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_promotes_role_and_sets_password(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);
        let user = repo.create(&request("reader@example.com")).await.unwrap();

        let updated = repo
            .update(
                user.id,
                &UserUpdateDBRequest {
                    display_name: None,
                    password_hash: Some("$argon2id$fake-hash".to_string()),
                    role: Some(Role::Admin),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.password_hash.as_deref(), Some("$argon2id$fake-hash"));
        // Untouched fields survive the partial update
        assert_eq!(updated.email, user.email);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_reports_absence(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);
        let user = repo.create(&request("reader@example.com")).await.unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(matches!(
            repo.update(user.id, &UserUpdateDBRequest::default()).await.unwrap_err(),
            DbError::NotFound
        ));
    }
}
