//! SupportRepository - Help desk tickets

use super::{Create, Read, Update};
use crate::dtos::{CreateSupportRequestDTO, SupportReplyDTO};
use crate::entities::{SupportRequest, SupportStatus};
use chrono::Utc;
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{info, instrument};

pub struct SupportRepository {
    connection_pool: SqlitePool,
}

impl SupportRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<SupportRequest>, Error> {
        sqlx::query_as::<_, SupportRequest>(
            "SELECT * FROM support_requests WHERE user_id = ? ORDER BY created_at DESC, ticket_id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn list_by_status(
        &self,
        status: Option<SupportStatus>,
    ) -> Result<Vec<SupportRequest>, Error> {
        let mut query_builder = QueryBuilder::<Sqlite>::new("SELECT * FROM support_requests");
        if let Some(status) = status {
            query_builder.push(" WHERE status = ").push_bind(status);
        }
        query_builder.push(" ORDER BY created_at ASC, ticket_id ASC");
        query_builder
            .build_query_as::<SupportRequest>()
            .fetch_all(&self.connection_pool)
            .await
    }

    pub async fn count_open(&self) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM support_requests WHERE status = ?")
            .bind(SupportStatus::Open)
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Create<SupportRequest, CreateSupportRequestDTO> for SupportRepository {
    #[instrument(skip(self, data), fields(user_id = %data.user_id))]
    async fn create(&self, data: &CreateSupportRequestDTO) -> Result<SupportRequest, Error> {
        let now = Utc::now();
        let ticket = sqlx::query_as::<_, SupportRequest>(
            r#"
            INSERT INTO support_requests (user_id, subject, message, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(&data.subject)
        .bind(&data.message)
        .bind(SupportStatus::Open)
        .bind(now)
        .bind(now)
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Support ticket {} opened", ticket.ticket_id);
        Ok(ticket)
    }
}

impl Read<SupportRequest, i64> for SupportRepository {
    async fn read(&self, id: &i64) -> Result<Option<SupportRequest>, Error> {
        sqlx::query_as::<_, SupportRequest>("SELECT * FROM support_requests WHERE ticket_id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<SupportRequest, SupportReplyDTO, i64> for SupportRepository {
    /// Stores the admin reply; a resolved ticket stays resolved
    #[instrument(skip(self, data))]
    async fn update(&self, id: &i64, data: &SupportReplyDTO) -> Result<SupportRequest, Error> {
        let mut query_builder =
            QueryBuilder::<Sqlite>::new("UPDATE support_requests SET admin_reply = ");
        query_builder.push_bind(data.reply.clone());
        query_builder.push(", updated_at = ").push_bind(Utc::now());
        if data.resolve {
            query_builder
                .push(", status = ")
                .push_bind(SupportStatus::Resolved);
        }
        query_builder.push(" WHERE ticket_id = ").push_bind(*id);
        query_builder.push(" RETURNING *");

        query_builder
            .build_query_as::<SupportRequest>()
            .fetch_one(&self.connection_pool)
            .await
    }
}
