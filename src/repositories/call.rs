//! CallRepository - Voice and video call records

use super::{Create, Read};
use crate::dtos::CreateCallDTO;
use crate::entities::{Call, CallStatus};
use chrono::Utc;
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{info, instrument, warn};

pub struct CallRepository {
    connection_pool: SqlitePool,
}

impl CallRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Call>, Error> {
        sqlx::query_as::<_, Call>(
            "SELECT * FROM calls WHERE caller_id = ? OR callee_id = ? ORDER BY started_at DESC, call_id DESC",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Compare-and-set status change. Answering stamps `answered_at`,
    /// every terminal status stamps `ended_at`.
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        call_id: i64,
        expected: CallStatus,
        next: CallStatus,
    ) -> Result<Option<Call>, Error> {
        let now = Utc::now();
        let mut query_builder = QueryBuilder::<Sqlite>::new("UPDATE calls SET status = ");
        query_builder.push_bind(next);
        match next {
            CallStatus::Ongoing => {
                query_builder.push(", answered_at = ").push_bind(now);
            }
            CallStatus::Ringing => {}
            _ => {
                query_builder.push(", ended_at = ").push_bind(now);
            }
        }
        query_builder.push(" WHERE call_id = ").push_bind(call_id);
        query_builder.push(" AND status = ").push_bind(expected);
        query_builder.push(" RETURNING *");

        let call = query_builder
            .build_query_as::<Call>()
            .fetch_optional(&self.connection_pool)
            .await?;

        if call.is_none() {
            warn!("Call {} was no longer {:?}", call_id, expected);
        }
        Ok(call)
    }
}

impl Create<Call, CreateCallDTO> for CallRepository {
    #[instrument(skip(self, data), fields(chat_id = %data.chat_id))]
    async fn create(&self, data: &CreateCallDTO) -> Result<Call, Error> {
        let call = sqlx::query_as::<_, Call>(
            r#"
            INSERT INTO calls (chat_id, caller_id, callee_id, kind, status, started_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.chat_id)
        .bind(data.caller_id)
        .bind(data.callee_id)
        .bind(data.kind)
        .bind(CallStatus::Ringing)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Call {} started", call.call_id);
        Ok(call)
    }
}

impl Read<Call, i64> for CallRepository {
    async fn read(&self, id: &i64) -> Result<Option<Call>, Error> {
        sqlx::query_as::<_, Call>("SELECT * FROM calls WHERE call_id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
