//! Admin services - Back-office review of payments, verifications, ads,
//! disputes and support tickets. Mounted behind `admin_middleware`.

use crate::core::{AppError, AppState};
use crate::dtos::{
    AdApprovalDTO, AdDTO, AdListQuery, AdTransitionDTO, DashboardStatsDTO, DisputeOutcome,
    GracePeriodDTO, OrderDTO, OrderTransitionDTO, ReasonDTO, ResolveDisputeDTO,
    SupportListQuery, SupportReplyDTO, SupportTicketDTO, UserDTO,
};
use crate::entities::{
    AdAction, AdStatus, NotificationKind, OrderAction, OrderStatus, Party, PaymentStatus, User,
    VerificationStatus, verification_review,
};
use crate::repositories::{Read, Update};
use crate::services::ad::{apply_ad_action, load_ad};
use crate::services::notification::notify;
use crate::services::order::{apply_order_action, order_link};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[instrument(skip(state))]
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStatsDTO>, AppError> {
    let mut stats = DashboardStatsDTO::default();

    for (role, count) in state.user.count_by_role().await? {
        stats
            .users_by_role
            .insert(DashboardStatsDTO::role_key(role), count);
    }
    for (status, count) in state.order.count_by_status().await? {
        stats
            .orders_by_status
            .insert(DashboardStatsDTO::status_key(status), count);
    }
    stats.open_disputes = stats
        .orders_by_status
        .get(&DashboardStatsDTO::status_key(OrderStatus::Disputed))
        .copied()
        .unwrap_or(0);
    stats.pending_payments = state.order.count_pending_payments().await?;
    stats.pending_verifications = state.user.count_pending_verifications().await?;
    stats.pending_ads = state.ad.count_pending().await?;
    stats.open_tickets = state.support.count_open().await?;

    Ok(Json(stats))
}

// ************************* PAYMENTS ************************* //

pub async fn list_pending_payments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OrderDTO>>, AppError> {
    let orders = state.order.list_pending_payments().await?;
    Ok(Json(orders.into_iter().map(OrderDTO::from).collect()))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn approve_payment(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<User>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderDTO>, AppError> {
    let order = apply_order_action(
        &state,
        &admin,
        order_id,
        OrderAction::ApprovePayment,
        OrderTransitionDTO {
            payment_status: Some(PaymentStatus::Verified),
            ..Default::default()
        },
    )
    .await?;

    for user_id in [order.seeker_id, order.provider_id] {
        notify(
            &state,
            user_id,
            NotificationKind::Payment,
            format!("Payment for \"{}\" was verified", order.title),
            order_link(order_id),
        )
        .await;
    }
    info!("Payment of order {} approved", order_id);
    Ok(Json(OrderDTO::from(order)))
}

#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id))]
pub async fn reject_payment(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<User>,
    Path(order_id): Path<i64>,
    Json(body): Json<ReasonDTO>,
) -> Result<Json<OrderDTO>, AppError> {
    body.validate()?;
    let order = apply_order_action(
        &state,
        &admin,
        order_id,
        OrderAction::RejectPayment,
        OrderTransitionDTO {
            payment_status: Some(PaymentStatus::Rejected),
            ..Default::default()
        },
    )
    .await?;

    notify(
        &state,
        order.seeker_id,
        NotificationKind::Payment,
        format!("Payment for \"{}\" was rejected: {}", order.title, body.reason),
        order_link(order_id),
    )
    .await;
    Ok(Json(OrderDTO::from(order)))
}

// ************************* VERIFICATIONS ************************* //

pub async fn list_pending_verifications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserDTO>>, AppError> {
    let users = state.user.list_pending_verifications().await?;
    Ok(Json(users.into_iter().map(UserDTO::from).collect()))
}

async fn review_verification(
    state: &AppState,
    user_id: i64,
    approve: bool,
    note: Option<String>,
) -> Result<User, AppError> {
    let provider = match state.user.read(&user_id).await? {
        Some(user) if user.is_provider() => user,
        _ => return Err(AppError::not_found("Provider not found")),
    };
    let next = verification_review(provider.verification_status, approve)?;
    state
        .user
        .set_verification(user_id, provider.verification_status, next, None, note)
        .await?
        .ok_or_else(|| AppError::conflict("Verification was reviewed by another request"))
}

#[instrument(skip(state))]
pub async fn approve_verification(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDTO>, AppError> {
    let provider = review_verification(&state, user_id, true, None).await?;
    notify(
        &state,
        user_id,
        NotificationKind::Verification,
        "Your account is now verified".to_string(),
        None,
    )
    .await;
    Ok(Json(UserDTO::from(provider)))
}

#[instrument(skip(state, body))]
pub async fn reject_verification(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(body): Json<ReasonDTO>,
) -> Result<Json<UserDTO>, AppError> {
    body.validate()?;
    let provider =
        review_verification(&state, user_id, false, Some(body.reason.clone())).await?;
    notify(
        &state,
        user_id,
        NotificationKind::Verification,
        format!("Your verification was rejected: {}", body.reason),
        None,
    )
    .await;
    Ok(Json(UserDTO::from(provider)))
}

// ************************* ADS ************************* //

/// `status=expired` and `status=active` are matched on the status computed at read time
pub async fn list_ads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdListQuery>,
) -> Result<Json<Vec<AdDTO>>, AppError> {
    let now = Utc::now();
    let stored = match query.status {
        Some(AdStatus::Expired) => Some(AdStatus::Active),
        other => other,
    };
    let ads = state.ad.list_by_status(stored).await?;
    Ok(Json(
        ads.into_iter()
            .map(|ad| AdDTO::at(ad, now))
            .filter(|ad| query.status.is_none_or(|status| ad.status == status))
            .collect(),
    ))
}

#[instrument(skip(state, body))]
pub async fn approve_ad(
    State(state): State<Arc<AppState>>,
    Path(ad_id): Path<i64>,
    Json(body): Json<AdApprovalDTO>,
) -> Result<Json<AdDTO>, AppError> {
    body.validate()?;
    let ad = load_ad(&state, ad_id).await?;
    let ad = apply_ad_action(
        &state,
        &ad,
        AdAction::Approve,
        Party::Admin,
        AdTransitionDTO {
            amount: Some(body.amount),
            ..Default::default()
        },
    )
    .await?;

    notify(
        &state,
        ad.provider_id,
        NotificationKind::Ad,
        format!("Your ad \"{}\" was approved, please pay {}", ad.title, body.amount),
        Some(format!("/ads/{}", ad_id)),
    )
    .await;
    Ok(Json(AdDTO::from(ad)))
}

#[instrument(skip(state, body))]
pub async fn reject_ad(
    State(state): State<Arc<AppState>>,
    Path(ad_id): Path<i64>,
    Json(body): Json<ReasonDTO>,
) -> Result<Json<AdDTO>, AppError> {
    body.validate()?;
    let ad = load_ad(&state, ad_id).await?;
    let ad = apply_ad_action(
        &state,
        &ad,
        AdAction::Reject,
        Party::Admin,
        AdTransitionDTO {
            rejection_reason: Some(body.reason.clone()),
            ..Default::default()
        },
    )
    .await?;

    notify(
        &state,
        ad.provider_id,
        NotificationKind::Ad,
        format!("Your ad \"{}\" was rejected: {}", ad.title, body.reason),
        Some(format!("/ads/{}", ad_id)),
    )
    .await;
    Ok(Json(AdDTO::from(ad)))
}

/// Activates the ad for `duration_days` starting now
#[instrument(skip(state))]
pub async fn confirm_ad_payment(
    State(state): State<Arc<AppState>>,
    Path(ad_id): Path<i64>,
) -> Result<Json<AdDTO>, AppError> {
    let ad = load_ad(&state, ad_id).await?;
    let now = Utc::now();
    let ad = apply_ad_action(
        &state,
        &ad,
        AdAction::ConfirmPayment,
        Party::Admin,
        AdTransitionDTO {
            starts_at: Some(now),
            ends_at: Some(now + Duration::days(ad.duration_days)),
            ..Default::default()
        },
    )
    .await?;

    notify(
        &state,
        ad.provider_id,
        NotificationKind::Ad,
        format!("Your ad \"{}\" is now live", ad.title),
        Some(format!("/ads/{}", ad_id)),
    )
    .await;
    Ok(Json(AdDTO::at(ad, now)))
}

#[instrument(skip(state, body))]
pub async fn reject_ad_payment(
    State(state): State<Arc<AppState>>,
    Path(ad_id): Path<i64>,
    Json(body): Json<ReasonDTO>,
) -> Result<Json<AdDTO>, AppError> {
    body.validate()?;
    let ad = load_ad(&state, ad_id).await?;
    let ad = apply_ad_action(
        &state,
        &ad,
        AdAction::RejectPayment,
        Party::Admin,
        AdTransitionDTO {
            rejection_reason: Some(body.reason.clone()),
            ..Default::default()
        },
    )
    .await?;

    notify(
        &state,
        ad.provider_id,
        NotificationKind::Ad,
        format!("Payment for ad \"{}\" was rejected: {}", ad.title, body.reason),
        Some(format!("/ads/{}", ad_id)),
    )
    .await;
    Ok(Json(AdDTO::from(ad)))
}

// ************************* DISPUTES ************************* //

pub async fn list_disputes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OrderDTO>>, AppError> {
    let orders = state.order.list_by_status(OrderStatus::Disputed).await?;
    Ok(Json(orders.into_iter().map(OrderDTO::from).collect()))
}

#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id))]
pub async fn resolve_dispute(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<User>,
    Path(order_id): Path<i64>,
    Json(body): Json<ResolveDisputeDTO>,
) -> Result<Json<OrderDTO>, AppError> {
    body.validate()?;
    let action = match body.in_favor_of {
        DisputeOutcome::Provider => OrderAction::ResolveForProvider,
        DisputeOutcome::Seeker => OrderAction::ResolveForSeeker,
    };
    let order = apply_order_action(
        &state,
        &admin,
        order_id,
        action,
        OrderTransitionDTO {
            resolution_note: Some(body.note),
            ..Default::default()
        },
    )
    .await?;

    for user_id in [order.seeker_id, order.provider_id] {
        notify(
            &state,
            user_id,
            NotificationKind::Order,
            format!("The dispute on \"{}\" was resolved", order.title),
            order_link(order_id),
        )
        .await;
    }
    info!("Dispute on order {} resolved as {:?}", order_id, order.status);
    Ok(Json(OrderDTO::from(order)))
}

#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id))]
pub async fn grant_grace_period(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<User>,
    Path(order_id): Path<i64>,
    Json(body): Json<GracePeriodDTO>,
) -> Result<Json<OrderDTO>, AppError> {
    body.validate()?;
    let until = Utc::now() + Duration::days(body.days);
    let order = apply_order_action(
        &state,
        &admin,
        order_id,
        OrderAction::GrantGracePeriod,
        OrderTransitionDTO {
            grace_period_until: Some(until),
            resolution_note: body.note,
            ..Default::default()
        },
    )
    .await?;

    for user_id in [order.seeker_id, order.provider_id] {
        notify(
            &state,
            user_id,
            NotificationKind::Order,
            format!(
                "The provider was granted until {} to finish \"{}\"",
                until.format("%Y-%m-%d"),
                order.title
            ),
            order_link(order_id),
        )
        .await;
    }
    Ok(Json(OrderDTO::from(order)))
}

// ************************* SUPPORT ************************* //

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SupportListQuery>,
) -> Result<Json<Vec<SupportTicketDTO>>, AppError> {
    let tickets = state.support.list_by_status(query.status).await?;
    Ok(Json(tickets.into_iter().map(SupportTicketDTO::from).collect()))
}

#[instrument(skip(state, body))]
pub async fn reply_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<i64>,
    Json(body): Json<SupportReplyDTO>,
) -> Result<Json<SupportTicketDTO>, AppError> {
    body.validate()?;
    if state.support.read(&ticket_id).await?.is_none() {
        return Err(AppError::not_found("Ticket not found"));
    }
    let ticket = state.support.update(&ticket_id, &body).await?;

    notify(
        &state,
        ticket.user_id,
        NotificationKind::Support,
        format!("Support replied to \"{}\"", ticket.subject),
        Some(format!("/support/{}", ticket_id)),
    )
    .await;
    Ok(Json(SupportTicketDTO::from(ticket)))
}
