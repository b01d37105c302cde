//! Shared helpers for database-backed tests.

use sqlx::PgPool;

use crate::{
    config::Config,
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
    types::{Role, SocialAccountId, UserId},
};

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.secret_key = Some("test-secret-key-for-testing-only".to_string());
    config.auth.session.cookie_secure = false;
    config
}

pub async fn create_test_user(pool: &PgPool, email: &str, password_hash: Option<&str>) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let username = email.split('@').next().unwrap_or(email).to_string();

    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            username,
            display_name: None,
            password_hash: password_hash.map(str::to_string),
            role: Role::Member,
        })
        .await
        .expect("Failed to create test user")
}

/// Insert a linked provider identity directly; the provider callback flow
/// that normally creates these rows lives outside this crate.
pub async fn link_social_account(pool: &PgPool, user_id: UserId, provider: &str) -> SocialAccountId {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");

    sqlx::query_scalar("INSERT INTO social_accounts (user_id, provider, provider_user_id) VALUES ($1, $2, $3) RETURNING id")
        .bind(user_id)
        .bind(provider)
        .bind(provider_identity(provider, user_id))
        .fetch_one(&mut *conn)
        .await
        .expect("Failed to link social account")
}

pub fn provider_identity(provider: &str, user_id: UserId) -> String {
    format!("{provider}-uid-{user_id}")
}
