//! Linked social account handlers.
//!
//! Unlinking is guarded by the lockout rule: a user whose account has no
//! password may not remove their last remaining social sign-in method.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{ApiResponse, social_accounts::SocialAccountResponse, users::CurrentUser},
    db::{
        errors::DbError,
        handlers::{Repository, SocialAccounts, Users},
    },
    errors::{Error, Result},
    types::SocialAccountId,
};

/// The signed-in user's linked social accounts.
#[utoipa::path(
    get,
    path = "/me/social-accounts",
    responses((status = 200, description = "Linked accounts", body = ApiResponse<Vec<SocialAccountResponse>>)),
    tag = "account"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_social_accounts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<SocialAccountResponse>>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let accounts = SocialAccounts::new(&mut conn).list_for_user(user.id).await?;

    Ok(Json(ApiResponse::new(accounts.into_iter().map(Into::into).collect())))
}

/// Unlink a social account.
#[utoipa::path(
    delete,
    path = "/me/social-accounts/{id}",
    responses(
        (status = 200, description = "Account unlinked"),
        (status = 400, description = "Would remove the only sign-in method"),
        (status = 404, description = "No such linked account"),
    ),
    tag = "account"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_social_account(
    State(state): State<AppState>,
    Path(id): Path<SocialAccountId>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let mut tx = state.db.begin().await.map_err(DbError::from)?;

    let account = SocialAccounts::new(&mut tx).get_by_id(id).await?;
    let owned = matches!(&account, Some(a) if a.user_id == user.id);
    if !owned {
        return Err(Error::NotFound {
            resource: "Social account".to_string(),
            id: id.to_string(),
        });
    }

    let db_user = Users::new(&mut tx).get_by_id(user.id).await?.ok_or(Error::Unauthenticated { message: None })?;
    let linked = SocialAccounts::new(&mut tx).count_for_user(user.id).await?;

    // Removing the last social login with no password set would lock the
    // account out entirely
    if db_user.password_hash.is_none() && linked <= 1 {
        return Err(Error::BadRequest {
            message: "Cannot remove your only sign-in method. Set a password first.".to_string(),
        });
    }

    let deleted = SocialAccounts::new(&mut tx).delete_for_user(id, user.id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "Social account".to_string(),
            id: id.to_string(),
        });
    }

    tx.commit().await.map_err(DbError::from)?;
    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_config, create_test_user, link_social_account};
    use axum::http::StatusCode;
    use sqlx::PgPool;

    async fn linked_count(pool: &PgPool, user: &CurrentUser) -> i64 {
        let mut conn = pool.acquire().await.unwrap();
        SocialAccounts::new(&mut conn).count_for_user(user.id).await.unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unlinking_only_sign_in_method_without_password_is_rejected(pool: PgPool) {
        let user = create_test_user(&pool, "oauth-only@example.com", None).await;
        let account_id = link_social_account(&pool, user.id, "google").await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();
        let current = CurrentUser::from(user);

        let result = delete_social_account(State(state), Path(account_id), current.clone()).await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        // The account must still be linked
        assert_eq!(linked_count(&pool, &current).await, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unlinking_only_social_account_succeeds_with_password_set(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", Some("$argon2id$fake-hash")).await;
        let account_id = link_social_account(&pool, user.id, "google").await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();
        let current = CurrentUser::from(user);

        delete_social_account(State(state), Path(account_id), current.clone()).await.unwrap();
        assert_eq!(linked_count(&pool, &current).await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unlinking_one_of_several_accounts_succeeds_without_password(pool: PgPool) {
        let user = create_test_user(&pool, "oauth-only@example.com", None).await;
        let google = link_social_account(&pool, user.id, "google").await;
        link_social_account(&pool, user.id, "kakao").await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();
        let current = CurrentUser::from(user);

        delete_social_account(State(state), Path(google), current.clone()).await.unwrap();
        assert_eq!(linked_count(&pool, &current).await, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unlinking_another_users_account_is_not_found(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com", Some("$argon2id$fake-hash")).await;
        let bob = create_test_user(&pool, "bob@example.com", Some("$argon2id$fake-hash")).await;
        let alices_account = link_social_account(&pool, alice.id, "google").await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();

        let result = delete_social_account(State(state), Path(alices_account), CurrentUser::from(bob)).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_listing_returns_only_own_accounts(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com", None).await;
        let bob = create_test_user(&pool, "bob@example.com", None).await;
        link_social_account(&pool, alice.id, "google").await;
        link_social_account(&pool, bob.id, "kakao").await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();

        let response = list_social_accounts(State(state), CurrentUser::from(alice)).await.unwrap();
        assert_eq!(response.0.data.len(), 1);
        assert_eq!(response.0.data[0].provider, "google");
    }
}
