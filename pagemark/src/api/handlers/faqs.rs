//! FAQ handlers: public listing plus admin CRUD.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        faqs::{FaqCreateRequest, FaqResponse, FaqUpdateRequest},
    },
    auth::current_user::AdminUser,
    db::{
        errors::DbError,
        handlers::{Faqs, Repository, faqs::FaqFilter},
        models::faqs::{FaqCreateDBRequest, FaqUpdateDBRequest},
    },
    errors::{Error, Result},
    types::FaqId,
};

/// Published FAQ entries in display order.
#[utoipa::path(
    get,
    path = "/faqs",
    responses((status = 200, description = "FAQ list", body = ApiResponse<Vec<FaqResponse>>)),
    tag = "faqs"
)]
#[instrument(skip(state))]
pub async fn list_faqs(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<FaqResponse>>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let faqs = Faqs::new(&mut conn).list(&FaqFilter { published_only: true }).await?;

    Ok(Json(ApiResponse::new(faqs.into_iter().map(Into::into).collect())))
}

/// All FAQ entries, drafts included (admin).
#[utoipa::path(
    get,
    path = "/admin/faqs",
    responses((status = 200, description = "FAQ list", body = ApiResponse<Vec<FaqResponse>>)),
    tag = "admin"
)]
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn list_all_faqs(State(state): State<AppState>, admin: AdminUser) -> Result<Json<ApiResponse<Vec<FaqResponse>>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let faqs = Faqs::new(&mut conn).list(&FaqFilter::default()).await?;

    Ok(Json(ApiResponse::new(faqs.into_iter().map(Into::into).collect())))
}

/// Create an FAQ entry (admin).
#[utoipa::path(
    post,
    path = "/admin/faqs",
    request_body = FaqCreateRequest,
    responses((status = 200, description = "FAQ created", body = ApiResponse<FaqResponse>)),
    tag = "admin"
)]
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id))]
pub async fn create_faq(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<FaqCreateRequest>,
) -> Result<Json<ApiResponse<FaqResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let faq = Faqs::new(&mut conn)
        .create(&FaqCreateDBRequest {
            question: payload.question,
            answer: payload.answer,
            position: payload.position,
            published: payload.published,
        })
        .await?;

    Ok(Json(ApiResponse::new(faq.into())))
}

/// Update an FAQ entry (admin).
#[utoipa::path(
    put,
    path = "/admin/faqs/{id}",
    request_body = FaqUpdateRequest,
    responses(
        (status = 200, description = "FAQ updated", body = ApiResponse<FaqResponse>),
        (status = 404, description = "No such FAQ"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id))]
pub async fn update_faq(
    State(state): State<AppState>,
    Path(id): Path<FaqId>,
    admin: AdminUser,
    Json(payload): Json<FaqUpdateRequest>,
) -> Result<Json<ApiResponse<FaqResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let faq = Faqs::new(&mut conn)
        .update(
            id,
            &FaqUpdateDBRequest {
                question: payload.question,
                answer: payload.answer,
                position: payload.position,
                published: payload.published,
            },
        )
        .await?;

    Ok(Json(ApiResponse::new(faq.into())))
}

/// Delete an FAQ entry (admin).
#[utoipa::path(
    delete,
    path = "/admin/faqs/{id}",
    responses(
        (status = 200, description = "FAQ deleted"),
        (status = 404, description = "No such FAQ"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn delete_faq(
    State(state): State<AppState>,
    Path(id): Path<FaqId>,
    admin: AdminUser,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Faqs::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "FAQ".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}
