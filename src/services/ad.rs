//! Ad services - Provider side of advertisement requests

use crate::core::{AppError, AppState, require_role};
use crate::dtos::{AdDTO, AdPaymentDTO, AdRequestDTO, AdTransitionDTO, CreateAdRequestDTO};
use crate::entities::{AdAction, AdRequest, NotificationKind, Party, User, UserRole, ad_transition};
use crate::repositories::{Create, Read};
use crate::services::notification::notify_admins;
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

pub(crate) async fn load_ad(state: &AppState, ad_id: i64) -> Result<AdRequest, AppError> {
    state
        .ad
        .read(&ad_id)
        .await?
        .ok_or_else(|| AppError::not_found("Ad request not found"))
}

/// Runs `action` as `party` against the stored status and persists it
pub(crate) async fn apply_ad_action(
    state: &AppState,
    ad: &AdRequest,
    action: AdAction,
    party: Party,
    data: AdTransitionDTO,
) -> Result<AdRequest, AppError> {
    let next = ad_transition(ad.status, action, party)?;
    debug!("Ad {} {:?} -> {:?}", ad.ad_id, ad.status, next);
    state
        .ad
        .transition(ad.ad_id, ad.status, next, &data)
        .await?
        .ok_or_else(|| AppError::conflict("Ad request was modified by another request"))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_ad(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<AdRequestDTO>,
) -> Result<(StatusCode, Json<AdDTO>), AppError> {
    require_role(&current_user, &[UserRole::Provider])?;
    if !current_user.is_verified_provider() {
        return Err(AppError::forbidden("Only verified providers can advertise"));
    }
    body.validate()?;

    let ad = state
        .ad
        .create(&CreateAdRequestDTO {
            provider_id: current_user.user_id,
            title: body.title,
            description: body.description,
            media_url: body.media_url,
            duration_days: body.duration_days,
        })
        .await?;

    notify_admins(
        &state,
        NotificationKind::Ad,
        format!("New ad request \"{}\" to review", ad.title),
        Some(format!("/admin/ads/{}", ad.ad_id)),
    )
    .await;

    info!("Ad request {} submitted", ad.ad_id);
    Ok((StatusCode::CREATED, Json(AdDTO::from(ad))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_my_ads(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<AdDTO>>, AppError> {
    let now = Utc::now();
    let ads = state.ad.list_by_provider(current_user.user_id).await?;
    Ok(Json(ads.into_iter().map(|ad| AdDTO::at(ad, now)).collect()))
}

pub async fn list_active_ads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AdDTO>>, AppError> {
    let now = Utc::now();
    let ads = state.ad.list_active(now).await?;
    Ok(Json(ads.into_iter().map(|ad| AdDTO::at(ad, now)).collect()))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn submit_ad_payment(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(ad_id): Path<i64>,
    Json(body): Json<AdPaymentDTO>,
) -> Result<Json<AdDTO>, AppError> {
    body.validate()?;
    let ad = load_ad(&state, ad_id).await?;
    if ad.provider_id != current_user.user_id {
        return Err(AppError::forbidden("You do not own this ad request"));
    }

    let ad = apply_ad_action(
        &state,
        &ad,
        AdAction::SubmitPayment,
        Party::Provider,
        AdTransitionDTO {
            payment_receipt_url: Some(body.receipt_url),
            ..Default::default()
        },
    )
    .await?;

    notify_admins(
        &state,
        NotificationKind::Ad,
        format!("Payment receipt to review for ad {}", ad_id),
        Some(format!("/admin/ads/{}", ad_id)),
    )
    .await;
    Ok(Json(AdDTO::from(ad)))
}
