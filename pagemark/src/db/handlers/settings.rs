//! Database repository for site settings.
//!
//! Settings are a key/value table, so this repository does not fit the
//! UUID-keyed [`Repository`](super::repository::Repository) trait and exposes
//! inherent methods instead.

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::{errors::Result, models::settings::SettingDBResponse};

pub struct Settings<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Settings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn list(&mut self) -> Result<Vec<SettingDBResponse>> {
        let rows = sqlx::query_as::<_, SettingDBResponse>("SELECT * FROM site_settings ORDER BY key")
            .fetch_all(&mut *self.db)
            .await?;
        Ok(rows)
    }

    /// Insert or overwrite a setting.
    #[instrument(skip(self, value), err)]
    pub async fn upsert(&mut self, key: &str, value: &str) -> Result<SettingDBResponse> {
        let row = sqlx::query_as::<_, SettingDBResponse>(
            r#"
            INSERT INTO site_settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM site_settings WHERE key = $1").bind(key).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_upsert_inserts_then_overwrites(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Settings::new(&mut conn);

        let created = repo.upsert("site_title", "Pagemark").await.unwrap();
        assert_eq!(created.key, "site_title");
        assert_eq!(created.value, "Pagemark");

        let updated = repo.upsert("site_title", "Pagemark Beta").await.unwrap();
        assert_eq!(updated.value, "Pagemark Beta");

        // Overwriting keeps a single row per key
        let all = repo.list().await.unwrap();
        assert_eq!(all.iter().filter(|s| s.key == "site_title").count(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_is_ordered_and_delete_reports_absence(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Settings::new(&mut conn);

        repo.upsert("footer_text", "Happy reading").await.unwrap();
        repo.upsert("banner_text", "Welcome").await.unwrap();

        let keys: Vec<_> = repo.list().await.unwrap().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["banner_text", "footer_text"]);

        assert!(repo.delete("banner_text").await.unwrap());
        assert!(!repo.delete("banner_text").await.unwrap());
    }
}
