//! Support ticket models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::types::{TicketId, UserId};

/// Ticket lifecycle status. Stored as text, parsed on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(format!("unknown ticket status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketResponse {
    #[schema(value_type = Uuid)]
    pub id: TicketId,
    #[schema(value_type = Uuid)]
    pub user_id: UserId,
    pub subject: String,
    pub body: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TicketCreateRequest {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TicketStatusUpdateRequest {
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [TicketStatus::Open, TicketStatus::InProgress, TicketStatus::Closed] {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
        assert!("resolved".parse::<TicketStatus>().is_err());
    }
}
