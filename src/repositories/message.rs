//! MessageRepository - Chat messages

use super::Create;
use crate::dtos::CreateMessageDTO;
use crate::entities::Message;
use chrono::{DateTime, Utc};
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, instrument};

pub struct MessageRepository {
    connection_pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Returns up to `limit` messages older than `before`, newest first
    #[instrument(skip(self))]
    pub async fn find_page(
        &self,
        chat_id: i64,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, Error> {
        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT * FROM messages WHERE chat_id = ");
        query_builder.push_bind(chat_id);
        if let Some(before) = before {
            query_builder
                .push(" AND julianday(created_at) < julianday(")
                .push_bind(before)
                .push(")");
        }
        query_builder
            .push(" ORDER BY message_id DESC LIMIT ")
            .push_bind(limit);

        let messages = query_builder
            .build_query_as::<Message>()
            .fetch_all(&self.connection_pool)
            .await?;

        debug!("Loaded {} messages", messages.len());
        Ok(messages)
    }

    /// Marks as read every message in the chat not sent by `reader_id`
    pub async fn mark_read(&self, chat_id: i64, reader_id: i64) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1 WHERE chat_id = ? AND sender_id != ? AND is_read = 0",
        )
        .bind(chat_id)
        .bind(reader_id)
        .execute(&self.connection_pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_unread(&self, chat_id: i64, reader_id: i64) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE chat_id = ? AND sender_id != ? AND is_read = 0",
        )
        .bind(chat_id)
        .bind(reader_id)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Create<Message, CreateMessageDTO> for MessageRepository {
    #[instrument(skip(self, data), fields(chat_id = %data.chat_id, sender_id = %data.sender_id))]
    async fn create(&self, data: &CreateMessageDTO) -> Result<Message, Error> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (chat_id, sender_id, content, is_read, created_at)
            VALUES (?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(data.chat_id)
        .bind(data.sender_id)
        .bind(&data.content)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::in_memory_pool;
    use crate::dtos::{CreateChatDTO, CreateUserDTO};
    use crate::entities::UserRole;
    use crate::repositories::{ChatRepository, UserRepository};

    async fn setup() -> (MessageRepository, i64, i64, i64) {
        let pool = in_memory_pool().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let user = users
                .create(&CreateUserDTO {
                    name: name.into(),
                    email: format!("{}@example.com", name),
                    password: "hash".into(),
                    role: UserRole::Seeker,
                    phone: None,
                })
                .await
                .unwrap();
            ids.push(user.user_id);
        }
        let chat = ChatRepository::new(pool.clone())
            .create(&CreateChatDTO {
                participant_a: ids[1],
                participant_b: ids[0],
                order_id: None,
            })
            .await
            .unwrap();
        (MessageRepository::new(pool), chat.chat_id, ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_page_is_newest_first_and_limited() {
        let (repo, chat_id, alice, _) = setup().await;
        for i in 0..5 {
            repo.create(&CreateMessageDTO {
                chat_id,
                sender_id: alice,
                content: format!("message {}", i),
            })
            .await
            .unwrap();
        }

        let page = repo.find_page(chat_id, None, 3).await.unwrap();
        let contents: Vec<_> = page.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["message 4", "message 3", "message 2"]);
    }

    #[tokio::test]
    async fn test_mark_read_skips_own_messages() {
        let (repo, chat_id, alice, bob) = setup().await;
        for sender_id in [alice, alice, bob] {
            repo.create(&CreateMessageDTO {
                chat_id,
                sender_id,
                content: "hi".into(),
            })
            .await
            .unwrap();
        }

        assert_eq!(repo.count_unread(chat_id, bob).await.unwrap(), 2);
        assert_eq!(repo.mark_read(chat_id, bob).await.unwrap(), 2);
        assert_eq!(repo.count_unread(chat_id, bob).await.unwrap(), 0);
        assert_eq!(repo.count_unread(chat_id, alice).await.unwrap(), 1);
    }
}
