//! User services - Own profile, account deletion, verification and portfolio

use crate::core::auth::cleared_session_cookie;
use crate::core::{AppError, AppState, require_role};
use crate::dtos::{
    CreatePortfolioItemDTO, PortfolioItemDTO, PortfolioItemRequestDTO, UpdateProfileDTO, UserDTO,
    VerificationRequestDTO,
};
use crate::entities::{NotificationKind, User, UserRole, VerificationStatus};
use crate::repositories::{Create, Delete, Read, Update};
use crate::services::notification::notify_admins;
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

pub async fn get_me(Extension(current_user): Extension<User>) -> Json<UserDTO> {
    Json(UserDTO::from(current_user))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<UpdateProfileDTO>,
) -> Result<Json<UserDTO>, AppError> {
    body.validate()?;
    if body.is_empty() {
        return Err(AppError::bad_request("Nothing to update"));
    }
    if body.touches_provider_fields() && !current_user.is_provider() {
        return Err(AppError::forbidden("Only providers have a service category and rate"));
    }

    let updated = state.user.update(&current_user.user_id, &body).await?;
    Ok(Json(UserDTO::from(updated)))
}

/// Anonymises the account of the caller. Refused while money or work is in flight.
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    if current_user.is_admin() {
        return Err(AppError::forbidden("Admin accounts cannot be deleted"));
    }
    if state.order.has_engaged_orders(current_user.user_id).await? {
        warn!("Deletion refused, engaged orders pending");
        return Err(AppError::conflict("Account has paid, running or disputed orders"));
    }

    let user_id = current_user.user_id;
    let cancelled = state.order.cancel_open_for_user(user_id).await?;
    let withdrawn = state.ad.withdraw_by_provider(user_id, Utc::now()).await?;
    debug!("Closed {} orders and {} ads", cancelled, withdrawn);
    state.portfolio.delete_by_provider(user_id).await?;
    state.user.delete(&current_user.user_id).await?;
    info!("Account deleted");

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cleared_session_cookie())],
    ))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn submit_verification(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<VerificationRequestDTO>,
) -> Result<Json<UserDTO>, AppError> {
    require_role(&current_user, &[UserRole::Provider])?;
    body.validate()?;

    let current = current_user.verification_status;
    if !current.can_submit() {
        return Err(AppError::conflict("Verification already pending or granted"));
    }

    let updated = state
        .user
        .set_verification(
            current_user.user_id,
            current,
            VerificationStatus::Pending,
            Some(body.document_url),
            None,
        )
        .await?
        .ok_or_else(|| AppError::conflict("Verification status changed, retry"))?;

    notify_admins(
        &state,
        NotificationKind::Verification,
        format!("{} submitted verification documents", updated.name),
        Some(format!("/admin/verifications/{}", updated.user_id)),
    )
    .await;

    Ok(Json(UserDTO::from(updated)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn add_portfolio_item(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<PortfolioItemRequestDTO>,
) -> Result<(StatusCode, Json<PortfolioItemDTO>), AppError> {
    require_role(&current_user, &[UserRole::Provider])?;
    body.validate()?;

    let item = state
        .portfolio
        .create(&CreatePortfolioItemDTO {
            provider_id: current_user.user_id,
            title: body.title,
            description: body.description,
            media_url: body.media_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PortfolioItemDTO::from(item))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_portfolio_item(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(item_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    match state.portfolio.read(&item_id).await? {
        Some(item) if item.provider_id == current_user.user_id => {
            state.portfolio.delete(&item_id).await?;
            Ok(StatusCode::NO_CONTENT)
        }
        _ => Err(AppError::not_found("Portfolio item not found")),
    }
}
