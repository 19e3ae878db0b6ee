//! ChatRepository - One-to-one conversations

use super::{Create, Read};
use crate::dtos::CreateChatDTO;
use crate::entities::Chat;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{info, instrument};

pub struct ChatRepository {
    connection_pool: SqlitePool,
}

impl ChatRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Looks up the chat between two users, in either order
    pub async fn find_between(&self, first: i64, second: i64) -> Result<Option<Chat>, Error> {
        let (participant_a, participant_b) = Chat::ordered_pair(first, second);
        sqlx::query_as::<_, Chat>(
            "SELECT * FROM chats WHERE participant_a = ? AND participant_b = ?",
        )
        .bind(participant_a)
        .bind(participant_b)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Chats of a user, most recently active first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Chat>, Error> {
        sqlx::query_as::<_, Chat>(
            r#"
            SELECT c.* FROM chats c
            LEFT JOIN messages m ON m.chat_id = c.chat_id
            WHERE c.participant_a = ? OR c.participant_b = ?
            GROUP BY c.chat_id
            ORDER BY COALESCE(MAX(m.message_id), 0) DESC, c.chat_id DESC
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<Chat, CreateChatDTO> for ChatRepository {
    #[instrument(skip(self, data))]
    async fn create(&self, data: &CreateChatDTO) -> Result<Chat, Error> {
        let (participant_a, participant_b) =
            Chat::ordered_pair(data.participant_a, data.participant_b);
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            INSERT INTO chats (participant_a, participant_b, order_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(participant_a)
        .bind(participant_b)
        .bind(data.order_id)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Chat {} created", chat.chat_id);
        Ok(chat)
    }
}

impl Read<Chat, i64> for ChatRepository {
    async fn read(&self, id: &i64) -> Result<Option<Chat>, Error> {
        sqlx::query_as::<_, Chat>("SELECT * FROM chats WHERE chat_id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
