//! Subscription handlers: current status, checkout handoff, cancellation.

use axum::{Json, extract::State};
use chrono::{Duration, Utc};
use tracing::{info, instrument};

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        subscriptions::{CheckoutRequest, CheckoutResponse, SubscriptionResponse, SubscriptionStatus},
        users::CurrentUser,
    },
    db::{
        errors::DbError,
        handlers::{PricingTiers, Repository, Subscriptions},
        models::{pricing::PricingTierDBResponse, subscriptions::SubscriptionUpsertDBRequest},
    },
    errors::{Error, Result},
};

/// The signed-in user's subscription, if any.
#[utoipa::path(
    get,
    path = "/me/subscription",
    responses((status = 200, description = "Subscription or null", body = ApiResponse<Option<SubscriptionResponse>>)),
    tag = "subscriptions"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_subscription(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Option<SubscriptionResponse>>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let subscription = Subscriptions::new(&mut conn).get_for_user(user.id).await?;

    Ok(Json(ApiResponse::new(subscription.map(Into::into))))
}

fn period_end(tier: &PricingTierDBResponse) -> chrono::DateTime<Utc> {
    let period = match tier.interval.as_str() {
        "year" => Duration::days(365),
        _ => Duration::days(30),
    };
    Utc::now() + period
}

/// Start a checkout with the billing provider for the chosen tier.
///
/// When the provider settles the payment synchronously the subscription is
/// activated here; otherwise activation waits for the provider's callback.
#[utoipa::path(
    post,
    path = "/subscriptions/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout URL", body = ApiResponse<CheckoutResponse>),
        (status = 404, description = "No such tier"),
    ),
    tag = "subscriptions"
)]
#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<ApiResponse<CheckoutResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let tier = PricingTiers::new(&mut conn)
        .get_by_id(payload.tier_id)
        .await?
        .ok_or(Error::NotFound {
            resource: "Pricing tier".to_string(),
            id: payload.tier_id.to_string(),
        })?;
    drop(conn);

    let session = state.billing.create_checkout(&user, &tier).await?;

    if session.settled {
        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        Subscriptions::new(&mut conn)
            .upsert(&SubscriptionUpsertDBRequest {
                user_id: user.id,
                tier_id: tier.id,
                status: SubscriptionStatus::Active,
                current_period_end: period_end(&tier),
            })
            .await?;
        info!(tier = %tier.name, "subscription activated at checkout");
    }

    Ok(Json(ApiResponse::new(CheckoutResponse { checkout_url: session.url })))
}

/// Cancel the signed-in user's subscription.
#[utoipa::path(
    post,
    path = "/subscriptions/cancel",
    responses(
        (status = 200, description = "Subscription canceled", body = ApiResponse<SubscriptionResponse>),
        (status = 404, description = "No subscription to cancel"),
    ),
    tag = "subscriptions"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn cancel_subscription(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<SubscriptionResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let subscription = Subscriptions::new(&mut conn).cancel(user.id).await?;

    Ok(Json(ApiResponse::new(subscription.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::models::pricing::PricingTierCreateDBRequest,
        test_utils::{create_test_config, create_test_user},
    };
    use sqlx::PgPool;

    async fn seed_tier(pool: &PgPool, interval: &str) -> PricingTierDBResponse {
        let mut conn = pool.acquire().await.unwrap();
        PricingTiers::new(&mut conn)
            .create(&PricingTierCreateDBRequest {
                name: "Reader Plus".to_string(),
                description: None,
                price_cents: 4900,
                currency: "KRW".to_string(),
                interval: interval.to_string(),
                features: vec!["Unlimited highlights".to_string()],
                position: 0,
                active: true,
            })
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_settled_checkout_activates_subscription(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", None).await;
        let tier = seed_tier(&pool, "month").await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();
        let current = CurrentUser::from(user);

        let response = checkout(
            State(state),
            current.clone(),
            Json(CheckoutRequest { tier_id: tier.id }),
        )
        .await
        .unwrap();
        assert!(response.0.data.checkout_url.contains(&tier.id.to_string()));

        let mut conn = pool.acquire().await.unwrap();
        let subscription = Subscriptions::new(&mut conn).get_for_user(current.id).await.unwrap().unwrap();
        assert_eq!(subscription.tier_id, tier.id);
        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert!(subscription.current_period_end > Utc::now() + Duration::days(29));
        assert!(subscription.current_period_end < Utc::now() + Duration::days(31));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_yearly_tier_gets_a_yearly_period(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", None).await;
        let tier = seed_tier(&pool, "year").await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();
        let current = CurrentUser::from(user);

        checkout(State(state), current.clone(), Json(CheckoutRequest { tier_id: tier.id }))
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let subscription = Subscriptions::new(&mut conn).get_for_user(current.id).await.unwrap().unwrap();
        assert!(subscription.current_period_end > Utc::now() + Duration::days(360));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_checkout_for_unknown_tier_is_not_found(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", None).await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();

        let result = checkout(
            State(state),
            CurrentUser::from(user),
            Json(CheckoutRequest {
                tier_id: uuid::Uuid::new_v4(),
            }),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_repeat_checkout_replaces_rather_than_duplicates(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", None).await;
        let monthly = seed_tier(&pool, "month").await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();
        let current = CurrentUser::from(user);

        checkout(
            State(state.clone()),
            current.clone(),
            Json(CheckoutRequest { tier_id: monthly.id }),
        )
        .await
        .unwrap();
        checkout(State(state), current.clone(), Json(CheckoutRequest { tier_id: monthly.id }))
            .await
            .unwrap();

        // One row per user, enforced by the upsert
        let mut conn = pool.acquire().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
            .bind(current.id)
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cancel_marks_the_subscription_canceled(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", None).await;
        let tier = seed_tier(&pool, "month").await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();
        let current = CurrentUser::from(user);

        checkout(
            State(state.clone()),
            current.clone(),
            Json(CheckoutRequest { tier_id: tier.id }),
        )
        .await
        .unwrap();

        let response = cancel_subscription(State(state), current).await.unwrap();
        assert_eq!(response.0.data.status, SubscriptionStatus::Canceled);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cancel_without_subscription_is_not_found(pool: PgPool) {
        let user = create_test_user(&pool, "reader@example.com", None).await;
        let state = AppState::new(pool.clone(), create_test_config()).unwrap();

        let result = cancel_subscription(State(state), CurrentUser::from(user)).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
    }
}
