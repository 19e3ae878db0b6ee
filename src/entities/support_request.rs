//! SupportRequest entity - Help desk ticket

use super::enums::SupportStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct SupportRequest {
    pub ticket_id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub status: SupportStatus,
    pub admin_reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
