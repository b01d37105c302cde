//! Site settings handlers plus the public stats endpoint.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::{
        ApiResponse,
        settings::{SettingResponse, SettingUpsertRequest, StatsResponse},
    },
    auth::current_user::AdminUser,
    db::{
        errors::DbError,
        handlers::{Campaigns, Settings, Users},
    },
    errors::{Error, Result},
};

/// Public aggregate counters for the landing page.
#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Site stats", body = ApiResponse<StatsResponse>)),
    tag = "settings"
)]
#[instrument(skip(state))]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<ApiResponse<StatsResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let members = Users::new(&mut conn).count().await?;
    let mut campaigns_repo = Campaigns::new(&mut conn);
    let campaigns = campaigns_repo.count().await?;
    let books_finished = campaigns_repo.total_books_finished().await?;

    Ok(Json(ApiResponse::new(StatsResponse {
        members,
        campaigns,
        books_finished,
    })))
}

/// All site settings (admin).
#[utoipa::path(
    get,
    path = "/admin/settings",
    responses((status = 200, description = "Settings", body = ApiResponse<Vec<SettingResponse>>)),
    tag = "admin"
)]
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn list_settings(State(state): State<AppState>, admin: AdminUser) -> Result<Json<ApiResponse<Vec<SettingResponse>>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let settings = Settings::new(&mut conn).list().await?;

    Ok(Json(ApiResponse::new(settings.into_iter().map(Into::into).collect())))
}

/// Create or overwrite a setting (admin).
#[utoipa::path(
    put,
    path = "/admin/settings/{key}",
    request_body = SettingUpsertRequest,
    responses((status = 200, description = "Setting stored", body = ApiResponse<SettingResponse>)),
    tag = "admin"
)]
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id, key = %key))]
pub async fn upsert_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    admin: AdminUser,
    Json(payload): Json<SettingUpsertRequest>,
) -> Result<Json<ApiResponse<SettingResponse>>> {
    if key.is_empty() || key.len() > 128 {
        return Err(Error::BadRequest {
            message: "Setting key must be between 1 and 128 characters".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let setting = Settings::new(&mut conn).upsert(&key, &payload.value).await?;

    Ok(Json(ApiResponse::new(setting.into())))
}

/// Delete a setting (admin).
#[utoipa::path(
    delete,
    path = "/admin/settings/{key}",
    responses(
        (status = 200, description = "Setting deleted"),
        (status = 404, description = "No such setting"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id, key = %key))]
pub async fn delete_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    admin: AdminUser,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Settings::new(&mut conn).delete(&key).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "Setting".to_string(),
            id: key,
        });
    }

    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}
