//! NotificationRepository - In-app notifications

use super::Create;
use crate::dtos::CreateNotificationDTO;
use crate::entities::Notification;
use chrono::Utc;
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::instrument;

pub struct NotificationRepository {
    connection_pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error> {
        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT * FROM notifications WHERE user_id = ");
        query_builder.push_bind(user_id);
        if unread_only {
            query_builder.push(" AND is_read = 0");
        }
        query_builder.push(" ORDER BY created_at DESC, notification_id DESC");
        query_builder
            .build_query_as::<Notification>()
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Returns false when the notification does not exist or belongs to someone else
    pub async fn mark_read(&self, notification_id: i64, user_id: i64) -> Result<bool, Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE notification_id = ? AND user_id = ?")
                .bind(notification_id)
                .bind(user_id)
                .execute(&self.connection_pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64, Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id)
                .execute(&self.connection_pool)
                .await?;
        Ok(result.rows_affected())
    }
}

impl Create<Notification, CreateNotificationDTO> for NotificationRepository {
    #[instrument(skip(self, data), fields(user_id = %data.user_id))]
    async fn create(&self, data: &CreateNotificationDTO) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, kind, message, link, is_read, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.kind)
        .bind(&data.message)
        .bind(&data.link)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::in_memory_pool;
    use crate::dtos::CreateUserDTO;
    use crate::entities::{NotificationKind, UserRole};
    use crate::repositories::UserRepository;

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_owner() {
        let pool = in_memory_pool().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let mut ids = Vec::new();
        for name in ["owner", "other"] {
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

        let repo = NotificationRepository::new(pool);
        let notification = repo
            .create(&CreateNotificationDTO {
                user_id: ids[0],
                kind: NotificationKind::Order,
                message: "Your order was accepted".into(),
                link: Some("/orders/1".into()),
            })
            .await
            .unwrap();
        assert!(!notification.is_read);

        assert!(!repo.mark_read(notification.notification_id, ids[1]).await.unwrap());
        assert_eq!(repo.list_for_user(ids[0], true).await.unwrap().len(), 1);

        assert!(repo.mark_read(notification.notification_id, ids[0]).await.unwrap());
        assert!(repo.list_for_user(ids[0], true).await.unwrap().is_empty());
        assert_eq!(repo.list_for_user(ids[0], false).await.unwrap().len(), 1);
    }
}
