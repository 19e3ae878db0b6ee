//! Notification DTOs

use crate::entities::{Notification, NotificationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationDTO {
    pub id: i64,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDTO {
    fn from(value: Notification) -> Self {
        Self {
            id: value.notification_id,
            kind: value.kind,
            message: value.message,
            link: value.link,
            is_read: value.is_read,
            created_at: value.created_at,
        }
    }
}

/// DTO to create a notification (without notification_id)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateNotificationDTO {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
}
