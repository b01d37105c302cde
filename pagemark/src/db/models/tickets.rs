//! Database models for support tickets.

use chrono::{DateTime, Utc};

use crate::api::models::tickets::{TicketResponse, TicketStatus};
use crate::types::{TicketId, UserId};

#[derive(Debug, Clone)]
pub struct TicketCreateDBRequest {
    pub user_id: UserId,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct TicketDBResponse {
    pub id: TicketId,
    pub user_id: UserId,
    pub subject: String,
    pub body: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TicketDBResponse> for TicketResponse {
    fn from(t: TicketDBResponse) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            subject: t.subject,
            body: t.body,
            status: t.status,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
