//! Call services - Signalling state of voice and video calls
//!
//! Media flows peer to peer; the server only records the call and pushes
//! `call_update` events to the other participant.

use crate::core::{AppError, AppState};
use crate::dtos::{CallDTO, CallRequestDTO, CreateCallDTO, WsEventDTO};
use crate::entities::{Call, CallAction, CallParty, NotificationKind, User, call_transition};
use crate::repositories::{Create, Read};
use crate::services::chat::load_chat_for;
use crate::services::notification::notify;
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{info, instrument};

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn start_call(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CallRequestDTO>,
) -> Result<(StatusCode, Json<CallDTO>), AppError> {
    let chat = load_chat_for(&state, body.chat_id, current_user.user_id).await?;
    let callee_id = chat.counterpart_of(current_user.user_id);

    let call = state
        .call
        .create(&CreateCallDTO {
            chat_id: chat.chat_id,
            caller_id: current_user.user_id,
            callee_id,
            kind: body.kind,
        })
        .await?;

    let dto = CallDTO::from(call);
    let pushed = state
        .users_online
        .send_if_online(callee_id, WsEventDTO::CallUpdate(dto.clone()));
    if !pushed {
        notify(
            &state,
            callee_id,
            NotificationKind::Call,
            format!("Missed call from {}", current_user.name),
            Some(format!("/chats/{}", chat.chat_id)),
        )
        .await;
    }

    info!("Call {} ringing", dto.id);
    Ok((StatusCode::CREATED, Json(dto)))
}

async fn apply_call_action(
    state: &AppState,
    current_user: &User,
    call_id: i64,
    action: CallAction,
) -> Result<Call, AppError> {
    let call = state
        .call
        .read(&call_id)
        .await?
        .ok_or_else(|| AppError::not_found("Call not found"))?;

    let party = if call.caller_id == current_user.user_id {
        CallParty::Caller
    } else if call.callee_id == current_user.user_id {
        CallParty::Callee
    } else {
        return Err(AppError::forbidden("You are not part of this call"));
    };

    let next = call_transition(call.status, action, party)?;
    let call = state
        .call
        .transition(call_id, call.status, next)
        .await?
        .ok_or_else(|| AppError::conflict("Call was updated by another request"))?;

    let other = if party == CallParty::Caller {
        call.callee_id
    } else {
        call.caller_id
    };
    state
        .users_online
        .send_if_online(other, WsEventDTO::CallUpdate(CallDTO::from(call.clone())));
    Ok(call)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn accept_call(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(call_id): Path<i64>,
) -> Result<Json<CallDTO>, AppError> {
    let call = apply_call_action(&state, &current_user, call_id, CallAction::Accept).await?;
    Ok(Json(CallDTO::from(call)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn decline_call(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(call_id): Path<i64>,
) -> Result<Json<CallDTO>, AppError> {
    let call = apply_call_action(&state, &current_user, call_id, CallAction::Decline).await?;
    Ok(Json(CallDTO::from(call)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn end_call(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(call_id): Path<i64>,
) -> Result<Json<CallDTO>, AppError> {
    let call = apply_call_action(&state, &current_user, call_id, CallAction::End).await?;
    Ok(Json(CallDTO::from(call)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_calls(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<CallDTO>>, AppError> {
    let calls = state.call.list_for_user(current_user.user_id).await?;
    Ok(Json(calls.into_iter().map(CallDTO::from).collect()))
}
