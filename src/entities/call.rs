//! Call entity - Voice or video call placed inside a chat

use super::enums::{CallKind, CallStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Call {
    pub call_id: i64,
    pub chat_id: i64,
    pub caller_id: i64,
    pub callee_id: i64,
    pub kind: CallKind,
    pub status: CallStatus,
    pub started_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}
