//! Chat DTOs - Data Transfer Objects for chats and messages

use crate::dtos::PublicUserDTO;
use crate::entities::{Chat, Message};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatDTO {
    pub id: i64,
    pub order_id: Option<i64>,
    pub counterpart: Option<PublicUserDTO>, // filled in by the service
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Chat> for ChatDTO {
    fn from(value: Chat) -> Self {
        Self {
            id: value.chat_id,
            order_id: value.order_id,
            counterpart: None,
            unread_count: 0,
            created_at: value.created_at,
        }
    }
}

/// Body to open (or fetch) a chat with another user
#[derive(Serialize, Deserialize, Debug)]
pub struct ChatRequestDTO {
    pub participant_id: i64,
    pub order_id: Option<i64>,
}

/// DTO to create a new chat (without chat_id), pair already ordered
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateChatDTO {
    pub participant_a: i64,
    pub participant_b: i64,
    pub order_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDTO {
    fn from(value: Message) -> Self {
        Self {
            id: value.message_id,
            chat_id: value.chat_id,
            sender_id: value.sender_id,
            content: value.content,
            is_read: value.is_read,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct SendMessageDTO {
    #[validate(length(min = 1, max = 5000, message = "Message content must be between 1 and 5000 characters"))]
    pub content: String,
}

/// DTO to create a new message (without message_id)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateMessageDTO {
    pub chat_id: i64,
    pub sender_id: i64,
    pub content: String,
}
