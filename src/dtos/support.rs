//! Support DTOs - Data Transfer Objects for help desk tickets

use crate::entities::{SupportRequest, SupportStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SupportTicketDTO {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub status: SupportStatus,
    pub admin_reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SupportRequest> for SupportTicketDTO {
    fn from(value: SupportRequest) -> Self {
        Self {
            id: value.ticket_id,
            user_id: value.user_id,
            subject: value.subject,
            message: value.message,
            status: value.status,
            admin_reply: value.admin_reply,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct SupportRequestDTO {
    #[validate(length(min = 3, max = 150, message = "Subject must be between 3 and 150 characters"))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000, message = "Message must be between 1 and 5000 characters"))]
    pub message: String,
}

/// DTO to create a ticket (without ticket_id)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateSupportRequestDTO {
    pub user_id: i64,
    pub subject: String,
    pub message: String,
}

/// Admin answer to a ticket
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct SupportReplyDTO {
    #[validate(length(min = 1, max = 5000, message = "Reply must be between 1 and 5000 characters"))]
    pub reply: String,

    #[serde(default)]
    pub resolve: bool,
}
