//! Order services - Order creation and the seeker/provider side of the lifecycle
//!
//! Every status change goes through [`apply_order_action`]: the pure
//! `order_transition` decides the next status, then the repository persists it
//! with a compare-and-set update.

use crate::core::{AppError, AppState, require_role};
use crate::dtos::{
    CreateOrderDTO, CreateRatingDTO, DeclineOrderDTO, DisputeRequestDTO, OrderDTO,
    OrderListQuery, OrderRequestDTO, OrderTransitionDTO, PaymentSubmissionDTO, RatingDTO,
    RatingRequestDTO,
};
use crate::entities::{
    NotificationKind, Order, OrderAction, OrderStatus, PaymentStatus, User, UserRole,
    order_transition,
};
use crate::repositories::{Create, Read};
use crate::services::notification::{notify, notify_admins};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

pub(crate) fn order_link(order_id: i64) -> Option<String> {
    Some(format!("/orders/{}", order_id))
}

async fn load_order(state: &AppState, order_id: i64) -> Result<Order, AppError> {
    state
        .order
        .read(&order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))
}

/// Applies `action` on behalf of `actor` and persists the result
#[instrument(skip(state, actor, data), fields(user_id = %actor.user_id))]
pub(crate) async fn apply_order_action(
    state: &AppState,
    actor: &User,
    order_id: i64,
    action: OrderAction,
    data: OrderTransitionDTO,
) -> Result<Order, AppError> {
    let order = load_order(state, order_id).await?;
    let party = order
        .party_of(actor)
        .ok_or_else(|| AppError::forbidden("You are not part of this order"))?;

    let next = order_transition(order.status, order.payment_status, action, party)?;
    debug!("Order {} {:?} -> {:?}", order_id, order.status, next);

    state
        .order
        .transition(order_id, order.status, order.payment_status, next, &data)
        .await?
        .ok_or_else(|| AppError::conflict("Order was modified by another request"))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<OrderRequestDTO>,
) -> Result<(StatusCode, Json<OrderDTO>), AppError> {
    require_role(&current_user, &[UserRole::Seeker])?;
    body.validate()?;

    let provider = match state.user.read(&body.provider_id).await? {
        Some(user) if user.is_provider() && !user.is_deleted() => user,
        _ => return Err(AppError::not_found("Provider not found")),
    };
    if !provider.is_verified_provider() {
        return Err(AppError::bad_request("Provider is not verified"));
    }

    let order = state
        .order
        .create(&CreateOrderDTO {
            seeker_id: current_user.user_id,
            provider_id: provider.user_id,
            title: body.title,
            description: body.description,
            amount: body.amount,
            scheduled_for: body.scheduled_for,
        })
        .await?;

    notify(
        &state,
        provider.user_id,
        NotificationKind::Order,
        format!("New order request: {}", order.title),
        order_link(order.order_id),
    )
    .await;

    info!("Order {} created", order.order_id);
    Ok((StatusCode::CREATED, Json(OrderDTO::from(order))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderDTO>>, AppError> {
    let orders = state
        .order
        .list_for_user(current_user.user_id, query.status)
        .await?;
    Ok(Json(orders.into_iter().map(OrderDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderDTO>, AppError> {
    let order = load_order(&state, order_id).await?;
    if order.party_of(&current_user).is_none() {
        return Err(AppError::forbidden("You are not part of this order"));
    }
    Ok(Json(OrderDTO::from(order)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn accept_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderDTO>, AppError> {
    let order = apply_order_action(
        &state,
        &current_user,
        order_id,
        OrderAction::Accept,
        OrderTransitionDTO::default(),
    )
    .await?;

    notify(
        &state,
        order.seeker_id,
        NotificationKind::Order,
        format!("Your order \"{}\" was accepted, payment is due", order.title),
        order_link(order_id),
    )
    .await;
    Ok(Json(OrderDTO::from(order)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn decline_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(order_id): Path<i64>,
    body: Option<Json<DeclineOrderDTO>>,
) -> Result<Json<OrderDTO>, AppError> {
    // a decline without a body carries no reason
    let body = body.map(|Json(body)| body).unwrap_or_default();
    body.validate()?;
    let order = apply_order_action(
        &state,
        &current_user,
        order_id,
        OrderAction::Decline,
        OrderTransitionDTO {
            decline_reason: body.reason,
            ..Default::default()
        },
    )
    .await?;

    notify(
        &state,
        order.seeker_id,
        NotificationKind::Order,
        format!("Your order \"{}\" was declined", order.title),
        order_link(order_id),
    )
    .await;
    Ok(Json(OrderDTO::from(order)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderDTO>, AppError> {
    let order = apply_order_action(
        &state,
        &current_user,
        order_id,
        OrderAction::Cancel,
        OrderTransitionDTO::default(),
    )
    .await?;

    notify(
        &state,
        order.provider_id,
        NotificationKind::Order,
        format!("Order \"{}\" was cancelled by the seeker", order.title),
        order_link(order_id),
    )
    .await;
    Ok(Json(OrderDTO::from(order)))
}

/// Seeker uploads the receipt of the transfer; an admin reviews it
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn submit_payment(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(order_id): Path<i64>,
    Json(body): Json<PaymentSubmissionDTO>,
) -> Result<Json<OrderDTO>, AppError> {
    body.validate()?;
    let order = apply_order_action(
        &state,
        &current_user,
        order_id,
        OrderAction::SubmitPayment,
        OrderTransitionDTO {
            payment_status: Some(PaymentStatus::Submitted),
            payment_receipt_url: Some(body.receipt_url),
            payment_reference: body.reference,
            ..Default::default()
        },
    )
    .await?;

    notify(
        &state,
        order.provider_id,
        NotificationKind::Payment,
        format!("Payment submitted for \"{}\", awaiting review", order.title),
        order_link(order_id),
    )
    .await;
    notify_admins(
        &state,
        NotificationKind::Payment,
        format!("Payment receipt to review for order {}", order_id),
        Some(format!("/admin/payments/{}", order_id)),
    )
    .await;
    Ok(Json(OrderDTO::from(order)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn start_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderDTO>, AppError> {
    let order = apply_order_action(
        &state,
        &current_user,
        order_id,
        OrderAction::Start,
        OrderTransitionDTO::default(),
    )
    .await?;

    notify(
        &state,
        order.seeker_id,
        NotificationKind::Order,
        format!("Work on \"{}\" has started", order.title),
        order_link(order_id),
    )
    .await;
    Ok(Json(OrderDTO::from(order)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn complete_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderDTO>, AppError> {
    let order = apply_order_action(
        &state,
        &current_user,
        order_id,
        OrderAction::Complete,
        OrderTransitionDTO::default(),
    )
    .await?;

    notify(
        &state,
        order.provider_id,
        NotificationKind::Order,
        format!("Order \"{}\" was marked as completed", order.title),
        order_link(order_id),
    )
    .await;
    Ok(Json(OrderDTO::from(order)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn dispute_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(order_id): Path<i64>,
    Json(body): Json<DisputeRequestDTO>,
) -> Result<Json<OrderDTO>, AppError> {
    body.validate()?;
    let order = apply_order_action(
        &state,
        &current_user,
        order_id,
        OrderAction::Dispute,
        OrderTransitionDTO {
            dispute_reason: Some(body.reason),
            disputed_by: Some(current_user.user_id),
            ..Default::default()
        },
    )
    .await?;

    warn!("Order {} disputed", order_id);
    notify(
        &state,
        order.counterpart_of(current_user.user_id),
        NotificationKind::Order,
        format!("A dispute was opened on \"{}\"", order.title),
        order_link(order_id),
    )
    .await;
    notify_admins(
        &state,
        NotificationKind::Order,
        format!("Order {} is disputed", order_id),
        Some(format!("/admin/disputes/{}", order_id)),
    )
    .await;
    Ok(Json(OrderDTO::from(order)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn rate_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(order_id): Path<i64>,
    Json(body): Json<RatingRequestDTO>,
) -> Result<(StatusCode, Json<RatingDTO>), AppError> {
    body.validate()?;
    let order = load_order(&state, order_id).await?;

    if order.seeker_id != current_user.user_id {
        return Err(AppError::forbidden("Only the seeker can rate this order"));
    }
    if order.status != OrderStatus::Completed {
        return Err(AppError::conflict("Only completed orders can be rated"));
    }
    if state.rating.find_by_order(order_id).await?.is_some() {
        return Err(AppError::conflict("Order already rated"));
    }

    let rating = state
        .rating
        .create(&CreateRatingDTO {
            order_id,
            seeker_id: order.seeker_id,
            provider_id: order.provider_id,
            stars: body.stars,
            comment: body.comment,
        })
        .await?;

    notify(
        &state,
        order.provider_id,
        NotificationKind::Order,
        format!("You received a {}-star rating", rating.stars),
        order_link(order_id),
    )
    .await;
    Ok((StatusCode::CREATED, Json(RatingDTO::from(rating))))
}
