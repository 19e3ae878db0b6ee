//! Support services - Help desk tickets opened by users

use crate::core::{AppError, AppState};
use crate::dtos::{CreateSupportRequestDTO, SupportRequestDTO, SupportTicketDTO};
use crate::entities::{NotificationKind, User};
use crate::repositories::{Create, Read};
use crate::services::notification::notify_admins;
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<SupportRequestDTO>,
) -> Result<(StatusCode, Json<SupportTicketDTO>), AppError> {
    body.validate()?;
    let ticket = state
        .support
        .create(&CreateSupportRequestDTO {
            user_id: current_user.user_id,
            subject: body.subject,
            message: body.message,
        })
        .await?;

    notify_admins(
        &state,
        NotificationKind::Support,
        format!("New support ticket: {}", ticket.subject),
        Some(format!("/admin/support/{}", ticket.ticket_id)),
    )
    .await;

    info!("Ticket {} opened", ticket.ticket_id);
    Ok((StatusCode::CREATED, Json(SupportTicketDTO::from(ticket))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_my_tickets(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<SupportTicketDTO>>, AppError> {
    let tickets = state.support.list_by_user(current_user.user_id).await?;
    Ok(Json(tickets.into_iter().map(SupportTicketDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(ticket_id): Path<i64>,
) -> Result<Json<SupportTicketDTO>, AppError> {
    let ticket = state
        .support
        .read(&ticket_id)
        .await?
        .ok_or_else(|| AppError::not_found("Ticket not found"))?;
    if ticket.user_id != current_user.user_id && !current_user.is_admin() {
        return Err(AppError::forbidden("You cannot access this ticket"));
    }
    Ok(Json(SupportTicketDTO::from(ticket)))
}
