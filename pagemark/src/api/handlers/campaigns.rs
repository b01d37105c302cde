//! Reading campaign handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        campaigns::{
            CampaignCreateRequest, CampaignResponse, CampaignUpdateRequest, ParticipationResponse, ProgressUpdateRequest,
        },
        users::CurrentUser,
    },
    auth::current_user::AdminUser,
    db::{
        errors::DbError,
        handlers::{Campaigns, Repository, campaigns::CampaignFilter},
        models::campaigns::{CampaignCreateDBRequest, CampaignUpdateDBRequest},
    },
    errors::{Error, Result},
    types::CampaignId,
};

#[derive(Debug, Default, Deserialize)]
pub struct CampaignListQuery {
    /// When true, only campaigns currently running
    #[serde(default)]
    pub active: bool,
}

fn campaign_not_found(id: CampaignId) -> Error {
    Error::NotFound {
        resource: "Campaign".to_string(),
        id: id.to_string(),
    }
}

/// List campaigns, optionally only the currently running ones.
#[utoipa::path(
    get,
    path = "/campaigns",
    responses((status = 200, description = "Campaign list", body = ApiResponse<Vec<CampaignResponse>>)),
    tag = "campaigns"
)]
#[instrument(skip(state))]
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<CampaignListQuery>,
) -> Result<Json<ApiResponse<Vec<CampaignResponse>>>> {
    let filter = if query.active {
        CampaignFilter::active_now()
    } else {
        CampaignFilter::default()
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let campaigns = Campaigns::new(&mut conn).list(&filter).await?;

    Ok(Json(ApiResponse::new(campaigns.into_iter().map(Into::into).collect())))
}

/// A single campaign with its participation aggregates.
#[utoipa::path(
    get,
    path = "/campaigns/{id}",
    responses(
        (status = 200, description = "Campaign", body = ApiResponse<CampaignResponse>),
        (status = 404, description = "No such campaign"),
    ),
    tag = "campaigns"
)]
#[instrument(skip(state))]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
) -> Result<Json<ApiResponse<CampaignResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let campaign = Campaigns::new(&mut conn).get_by_id(id).await?.ok_or_else(|| campaign_not_found(id))?;

    Ok(Json(ApiResponse::new(campaign.into())))
}

/// Join a campaign as the signed-in member.
#[utoipa::path(
    post,
    path = "/campaigns/{id}/join",
    responses(
        (status = 200, description = "Joined", body = ApiResponse<ParticipationResponse>),
        (status = 404, description = "No such campaign"),
        (status = 409, description = "Already joined"),
    ),
    tag = "campaigns"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn join_campaign(
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<ParticipationResponse>>> {
    let mut tx = state.db.begin().await.map_err(DbError::from)?;
    let mut campaigns = Campaigns::new(&mut tx);

    if campaigns.get_by_id(id).await?.is_none() {
        return Err(campaign_not_found(id));
    }
    let participation = campaigns.join(id, user.id).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(Json(ApiResponse::new(participation.into())))
}

/// The signed-in member's participation in a campaign, if any.
#[utoipa::path(
    get,
    path = "/campaigns/{id}/participation",
    responses(
        (status = 200, description = "Participation or null", body = ApiResponse<Option<ParticipationResponse>>),
        (status = 404, description = "No such campaign"),
    ),
    tag = "campaigns"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_participation(
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Option<ParticipationResponse>>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut campaigns = Campaigns::new(&mut conn);

    if campaigns.get_by_id(id).await?.is_none() {
        return Err(campaign_not_found(id));
    }
    let participation = campaigns.get_participation(id, user.id).await?;

    Ok(Json(ApiResponse::new(participation.map(Into::into))))
}

/// Record the signed-in member's progress in a campaign.
#[utoipa::path(
    post,
    path = "/campaigns/{id}/progress",
    request_body = ProgressUpdateRequest,
    responses(
        (status = 200, description = "Progress updated", body = ApiResponse<ParticipationResponse>),
        (status = 404, description = "Not participating in this campaign"),
    ),
    tag = "campaigns"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update_progress(
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
    user: CurrentUser,
    Json(payload): Json<ProgressUpdateRequest>,
) -> Result<Json<ApiResponse<ParticipationResponse>>> {
    if payload.books_finished < 0 {
        return Err(Error::BadRequest {
            message: "books_finished cannot be negative".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let participation = Campaigns::new(&mut conn).update_progress(id, user.id, payload.books_finished).await?;

    Ok(Json(ApiResponse::new(participation.into())))
}

/// Create a campaign (admin).
#[utoipa::path(
    post,
    path = "/admin/campaigns",
    request_body = CampaignCreateRequest,
    responses((status = 200, description = "Campaign created", body = ApiResponse<CampaignResponse>)),
    tag = "admin"
)]
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id, title = %payload.title))]
pub async fn create_campaign(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<CampaignCreateRequest>,
) -> Result<Json<ApiResponse<CampaignResponse>>> {
    if payload.ends_at <= payload.starts_at {
        return Err(Error::BadRequest {
            message: "Campaign must end after it starts".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let campaign = Campaigns::new(&mut conn)
        .create(&CampaignCreateDBRequest {
            title: payload.title,
            description: payload.description,
            starts_at: payload.starts_at,
            ends_at: payload.ends_at,
            goal_books: payload.goal_books,
        })
        .await?;

    Ok(Json(ApiResponse::new(campaign.into())))
}

/// Update a campaign (admin).
#[utoipa::path(
    put,
    path = "/admin/campaigns/{id}",
    request_body = CampaignUpdateRequest,
    responses(
        (status = 200, description = "Campaign updated", body = ApiResponse<CampaignResponse>),
        (status = 404, description = "No such campaign"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id))]
pub async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
    admin: AdminUser,
    Json(payload): Json<CampaignUpdateRequest>,
) -> Result<Json<ApiResponse<CampaignResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let campaign = Campaigns::new(&mut conn)
        .update(
            id,
            &CampaignUpdateDBRequest {
                title: payload.title,
                description: payload.description,
                starts_at: payload.starts_at,
                ends_at: payload.ends_at,
                goal_books: payload.goal_books,
            },
        )
        .await?;

    Ok(Json(ApiResponse::new(campaign.into())))
}

/// Delete a campaign (admin).
#[utoipa::path(
    delete,
    path = "/admin/campaigns/{id}",
    responses(
        (status = 200, description = "Campaign deleted"),
        (status = 404, description = "No such campaign"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
    admin: AdminUser,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Campaigns::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(campaign_not_found(id));
    }

    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}
