//! Sponsor handlers: public listing plus admin create/delete.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        sponsors::{SponsorCreateRequest, SponsorResponse},
    },
    auth::current_user::AdminUser,
    db::{
        errors::DbError,
        handlers::Sponsors,
        models::sponsors::SponsorCreateDBRequest,
    },
    errors::{Error, Result},
    types::SponsorId,
};

/// Sponsors in display order.
#[utoipa::path(
    get,
    path = "/sponsors",
    responses((status = 200, description = "Sponsor list", body = ApiResponse<Vec<SponsorResponse>>)),
    tag = "sponsors"
)]
#[instrument(skip(state))]
pub async fn list_sponsors(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<SponsorResponse>>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let sponsors = Sponsors::new(&mut conn).list().await?;

    Ok(Json(ApiResponse::new(sponsors.into_iter().map(Into::into).collect())))
}

/// Add a sponsor (admin).
#[utoipa::path(
    post,
    path = "/admin/sponsors",
    request_body = SponsorCreateRequest,
    responses((status = 200, description = "Sponsor created", body = ApiResponse<SponsorResponse>)),
    tag = "admin"
)]
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id, name = %payload.name))]
pub async fn create_sponsor(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<SponsorCreateRequest>,
) -> Result<Json<ApiResponse<SponsorResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let sponsor = Sponsors::new(&mut conn)
        .create(&SponsorCreateDBRequest {
            name: payload.name,
            url: payload.url,
            logo_url: payload.logo_url,
            position: payload.position,
        })
        .await?;

    Ok(Json(ApiResponse::new(sponsor.into())))
}

/// Remove a sponsor (admin).
#[utoipa::path(
    delete,
    path = "/admin/sponsors/{id}",
    responses(
        (status = 200, description = "Sponsor deleted"),
        (status = 404, description = "No such sponsor"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn delete_sponsor(
    State(state): State<AppState>,
    Path(id): Path<SponsorId>,
    admin: AdminUser,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Sponsors::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "Sponsor".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}
