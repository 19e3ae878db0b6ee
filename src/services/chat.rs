//! Chat services - One-to-one conversations and their messages

use crate::core::{AppError, AppState};
use crate::dtos::{
    ChatDTO, ChatRequestDTO, CreateChatDTO, CreateMessageDTO, MessageDTO, MessagesQuery,
    PublicUserDTO, SendMessageDTO, WsEventDTO,
};
use crate::entities::{Chat, User};
use crate::repositories::{Create, Read};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use futures_util::future::try_join_all;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Chat the user takes part in; 404 when missing, 403 for outsiders
pub(crate) async fn load_chat_for(
    state: &AppState,
    chat_id: i64,
    user_id: i64,
) -> Result<Chat, AppError> {
    let chat = state
        .chat
        .read(&chat_id)
        .await?
        .ok_or_else(|| AppError::not_found("Chat not found"))?;
    if !chat.has_participant(user_id) {
        return Err(AppError::forbidden("You are not a participant of this chat"));
    }
    Ok(chat)
}

async fn enrich(state: &AppState, chat: Chat, user_id: i64) -> Result<ChatDTO, sqlx::Error> {
    let counterpart = state.user.read(&chat.counterpart_of(user_id)).await?;
    let unread_count = state.msg.count_unread(chat.chat_id, user_id).await?;
    let mut dto = ChatDTO::from(chat);
    dto.counterpart = counterpart.map(PublicUserDTO::from);
    dto.unread_count = unread_count;
    Ok(dto)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<ChatDTO>>, AppError> {
    let user_id = current_user.user_id;
    let chats = state.chat.list_for_user(user_id).await?;
    debug!("User is part of {} chats", chats.len());

    let chats_dto = try_join_all(chats.into_iter().map(|chat| enrich(&state, chat, user_id))).await?;
    Ok(Json(chats_dto))
}

/// Returns the chat between the caller and `participant_id`, creating it on first contact
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<ChatRequestDTO>,
) -> Result<(StatusCode, Json<ChatDTO>), AppError> {
    let user_id = current_user.user_id;
    if body.participant_id == user_id {
        return Err(AppError::bad_request("Cannot open a chat with yourself"));
    }
    if state.user.read(&body.participant_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    if let Some(chat) = state.chat.find_between(user_id, body.participant_id).await? {
        debug!("Chat {} already exists", chat.chat_id);
        return Ok((StatusCode::OK, Json(enrich(&state, chat, user_id).await?)));
    }

    if let Some(order_id) = body.order_id {
        let order = state
            .order
            .read(&order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order not found"))?;
        let pair = Chat::ordered_pair(order.seeker_id, order.provider_id);
        if pair != Chat::ordered_pair(user_id, body.participant_id) {
            return Err(AppError::bad_request("Order does not involve both participants"));
        }
    }

    let dto = CreateChatDTO {
        participant_a: user_id,
        participant_b: body.participant_id,
        order_id: body.order_id,
    };
    let (chat, created) = insert_or_existing(&state, &dto).await?;
    let status = if created {
        info!("Chat {} created", chat.chat_id);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(enrich(&state, chat, user_id).await?)))
}

/// Inserts the chat, or returns the one a concurrent request inserted first.
/// The flag tells whether this call created it.
pub(crate) async fn insert_or_existing(
    state: &AppState,
    data: &CreateChatDTO,
) -> Result<(Chat, bool), AppError> {
    match state.chat.create(data).await {
        Ok(chat) => Ok((chat, true)),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            debug!("Chat for the pair was created concurrently");
            let chat = state
                .chat
                .find_between(data.participant_a, data.participant_b)
                .await?
                .ok_or_else(|| AppError::conflict("Chat could not be created"))?;
            Ok((chat, false))
        }
        Err(e) => Err(e.into()),
    }
}


#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_chat_messages(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(chat_id): Path<i64>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageDTO>>, AppError> {
    load_chat_for(&state, chat_id, current_user.user_id).await?;
    let messages = state
        .msg
        .find_page(chat_id, query.before, query.page_size())
        .await?;
    Ok(Json(messages.into_iter().map(MessageDTO::from).collect()))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(chat_id): Path<i64>,
    Json(body): Json<SendMessageDTO>,
) -> Result<(StatusCode, Json<MessageDTO>), AppError> {
    body.validate()?;
    let chat = load_chat_for(&state, chat_id, current_user.user_id).await?;

    let message = state
        .msg
        .create(&CreateMessageDTO {
            chat_id,
            sender_id: current_user.user_id,
            content: body.content,
        })
        .await?;

    let dto = MessageDTO::from(message);
    state.users_online.send_if_online(
        chat.counterpart_of(current_user.user_id),
        WsEventDTO::NewMessage(dto.clone()),
    );
    Ok((StatusCode::CREATED, Json(dto)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn mark_chat_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(chat_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    load_chat_for(&state, chat_id, current_user.user_id).await?;
    let updated = state.msg.mark_read(chat_id, current_user.user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}
