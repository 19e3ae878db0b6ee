//! Call DTOs - Data Transfer Objects for voice and video calls

use crate::entities::{Call, CallKind, CallStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CallDTO {
    pub id: i64,
    pub chat_id: i64,
    pub caller_id: i64,
    pub callee_id: i64,
    pub kind: CallKind,
    pub status: CallStatus,
    pub started_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl From<Call> for CallDTO {
    fn from(value: Call) -> Self {
        Self {
            id: value.call_id,
            chat_id: value.chat_id,
            caller_id: value.caller_id,
            callee_id: value.callee_id,
            kind: value.kind,
            status: value.status,
            started_at: value.started_at,
            answered_at: value.answered_at,
            ended_at: value.ended_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CallRequestDTO {
    pub chat_id: i64,
    pub kind: CallKind,
}

/// DTO to create a call (without call_id)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateCallDTO {
    pub chat_id: i64,
    pub caller_id: i64,
    pub callee_id: i64,
    pub kind: CallKind,
}
