//! Pricing tier handlers: public listing plus admin CRUD.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        pricing::{PricingTierCreateRequest, PricingTierResponse, PricingTierUpdateRequest},
    },
    auth::current_user::AdminUser,
    db::{
        errors::DbError,
        handlers::{PricingTiers, Repository, pricing::PricingTierFilter},
        models::pricing::{PricingTierCreateDBRequest, PricingTierUpdateDBRequest},
    },
    errors::{Error, Result},
    types::TierId,
};

const VALID_INTERVALS: [&str; 2] = ["month", "year"];

fn validate_interval(interval: &str) -> Result<()> {
    if VALID_INTERVALS.contains(&interval) {
        Ok(())
    } else {
        Err(Error::BadRequest {
            message: "Billing interval must be 'month' or 'year'".to_string(),
        })
    }
}

/// Active pricing tiers in display order.
#[utoipa::path(
    get,
    path = "/pricing",
    responses((status = 200, description = "Pricing tiers", body = ApiResponse<Vec<PricingTierResponse>>)),
    tag = "pricing"
)]
#[instrument(skip(state))]
pub async fn list_pricing(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<PricingTierResponse>>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let tiers = PricingTiers::new(&mut conn).list(&PricingTierFilter { active_only: true }).await?;

    Ok(Json(ApiResponse::new(tiers.into_iter().map(Into::into).collect())))
}

/// Create a pricing tier (admin).
#[utoipa::path(
    post,
    path = "/admin/pricing",
    request_body = PricingTierCreateRequest,
    responses((status = 200, description = "Tier created", body = ApiResponse<PricingTierResponse>)),
    tag = "admin"
)]
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id, name = %payload.name))]
pub async fn create_tier(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<PricingTierCreateRequest>,
) -> Result<Json<ApiResponse<PricingTierResponse>>> {
    validate_interval(&payload.interval)?;
    if payload.price_cents < 0 {
        return Err(Error::BadRequest {
            message: "Price cannot be negative".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let tier = PricingTiers::new(&mut conn)
        .create(&PricingTierCreateDBRequest {
            name: payload.name,
            description: payload.description,
            price_cents: payload.price_cents,
            currency: payload.currency,
            interval: payload.interval,
            features: payload.features,
            position: payload.position,
            active: payload.active,
        })
        .await?;

    Ok(Json(ApiResponse::new(tier.into())))
}

/// Update a pricing tier (admin).
#[utoipa::path(
    put,
    path = "/admin/pricing/{id}",
    request_body = PricingTierUpdateRequest,
    responses(
        (status = 200, description = "Tier updated", body = ApiResponse<PricingTierResponse>),
        (status = 404, description = "No such tier"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id))]
pub async fn update_tier(
    State(state): State<AppState>,
    Path(id): Path<TierId>,
    admin: AdminUser,
    Json(payload): Json<PricingTierUpdateRequest>,
) -> Result<Json<ApiResponse<PricingTierResponse>>> {
    if let Some(interval) = &payload.interval {
        validate_interval(interval)?;
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let tier = PricingTiers::new(&mut conn)
        .update(
            id,
            &PricingTierUpdateDBRequest {
                name: payload.name,
                description: payload.description,
                price_cents: payload.price_cents,
                currency: payload.currency,
                interval: payload.interval,
                features: payload.features,
                position: payload.position,
                active: payload.active,
            },
        )
        .await?;

    Ok(Json(ApiResponse::new(tier.into())))
}

/// Delete a pricing tier (admin).
#[utoipa::path(
    delete,
    path = "/admin/pricing/{id}",
    responses(
        (status = 200, description = "Tier deleted"),
        (status = 404, description = "No such tier"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn delete_tier(
    State(state): State<AppState>,
    Path(id): Path<TierId>,
    admin: AdminUser,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = PricingTiers::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "Pricing tier".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_validation() {
        assert!(validate_interval("month").is_ok());
        assert!(validate_interval("year").is_ok());
        assert!(validate_interval("week").is_err());
    }
}
