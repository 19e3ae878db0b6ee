//! Notification services - In-app notifications and their delivery

use crate::core::{AppError, AppState};
use crate::dtos::{CreateNotificationDTO, NotificationDTO, NotificationQuery, WsEventDTO};
use crate::entities::{NotificationKind, User, UserRole};
use crate::repositories::Create;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Stores a notification and pushes it to the user when online.
/// Failures are logged and swallowed, the triggering request never fails here.
#[instrument(skip(state, message, link))]
pub(crate) async fn notify(
    state: &AppState,
    user_id: i64,
    kind: NotificationKind,
    message: String,
    link: Option<String>,
) {
    let data = CreateNotificationDTO {
        user_id,
        kind,
        message,
        link,
    };
    match state.notification.create(&data).await {
        Ok(notification) => {
            let pushed = state
                .users_online
                .send_if_online(user_id, WsEventDTO::Notification(notification.into()));
            debug!("Notification stored, pushed: {}", pushed);
        }
        Err(e) => warn!("Failed to store notification for user {}: {:?}", user_id, e),
    }
}

/// Sends the same notification to every admin account
pub(crate) async fn notify_admins(
    state: &AppState,
    kind: NotificationKind,
    message: String,
    link: Option<String>,
) {
    let admins = match state.user.ids_by_role(UserRole::Admin).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Failed to load admins to notify: {:?}", e);
            return;
        }
    };
    for admin_id in admins {
        notify(state, admin_id, kind, message.clone(), link.clone()).await;
    }
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<NotificationDTO>>, AppError> {
    let notifications = state
        .notification
        .list_for_user(current_user.user_id, query.unread_only)
        .await?;
    Ok(Json(notifications.into_iter().map(NotificationDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(notification_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    // someone else's notification is reported as missing
    if !state
        .notification
        .mark_read(notification_id, current_user.user_id)
        .await?
    {
        return Err(AppError::not_found("Notification not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn mark_all_notifications_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let updated = state.notification.mark_all_read(current_user.user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}
