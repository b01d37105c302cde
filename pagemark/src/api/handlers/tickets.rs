//! Support ticket handlers.

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
        tickets::{TicketCreateRequest, TicketResponse, TicketStatus, TicketStatusUpdateRequest},
        users::CurrentUser,
    },
    auth::current_user::AdminUser,
    db::{
        errors::DbError,
        handlers::{Repository, Tickets, tickets::TicketFilter},
        models::tickets::TicketCreateDBRequest,
    },
    errors::{Error, Result},
    types::TicketId,
};

#[derive(Debug, Default, Deserialize)]
pub struct TicketListQuery {
    pub status: Option<TicketStatus>,
}

/// Open a support ticket as the signed-in user.
#[utoipa::path(
    post,
    path = "/tickets",
    request_body = TicketCreateRequest,
    responses(
        (status = 200, description = "Ticket created", body = ApiResponse<TicketResponse>),
        (status = 400, description = "Empty subject or body"),
    ),
    tag = "tickets"
)]
#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_ticket(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<TicketCreateRequest>,
) -> Result<Json<ApiResponse<TicketResponse>>> {
    if payload.subject.trim().is_empty() || payload.body.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Subject and body are required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let ticket = Tickets::new(&mut conn)
        .create(&TicketCreateDBRequest {
            user_id: user.id,
            subject: payload.subject,
            body: payload.body,
        })
        .await?;

    Ok(Json(ApiResponse::new(ticket.into())))
}

/// The signed-in user's own tickets, newest first.
#[utoipa::path(
    get,
    path = "/tickets",
    responses((status = 200, description = "Ticket list", body = ApiResponse<Vec<TicketResponse>>)),
    tag = "tickets"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_own_tickets(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<TicketListQuery>,
) -> Result<Json<ApiResponse<Vec<TicketResponse>>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let tickets = Tickets::new(&mut conn)
        .list(&TicketFilter {
            user_id: Some(user.id),
            status: query.status,
        })
        .await?;

    Ok(Json(ApiResponse::new(tickets.into_iter().map(Into::into).collect())))
}

/// Every ticket in the system (admin).
#[utoipa::path(
    get,
    path = "/admin/tickets",
    responses((status = 200, description = "Ticket list", body = ApiResponse<Vec<TicketResponse>>)),
    tag = "admin"
)]
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn list_all_tickets(
    State(state): State<AppState>,
    admin: AdminUser,
    Query(query): Query<TicketListQuery>,
) -> Result<Json<ApiResponse<Vec<TicketResponse>>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let tickets = Tickets::new(&mut conn)
        .list(&TicketFilter {
            user_id: None,
            status: query.status,
        })
        .await?;

    Ok(Json(ApiResponse::new(tickets.into_iter().map(Into::into).collect())))
}

/// Move a ticket through its lifecycle (admin).
#[utoipa::path(
    put,
    path = "/admin/tickets/{id}/status",
    request_body = TicketStatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<TicketResponse>),
        (status = 404, description = "No such ticket"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.id))]
pub async fn update_ticket_status(
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
    admin: AdminUser,
    Json(payload): Json<TicketStatusUpdateRequest>,
) -> Result<Json<ApiResponse<TicketResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let ticket = Tickets::new(&mut conn).update(id, &payload.status).await?;

    Ok(Json(ApiResponse::new(ticket.into())))
}
