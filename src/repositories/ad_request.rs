//! AdRequestRepository - Advertisement requests

use super::{Create, Read};
use crate::dtos::{AdTransitionDTO, CreateAdRequestDTO};
use crate::entities::{AdRequest, AdStatus};
use chrono::{DateTime, Utc};
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{info, instrument, warn};

pub struct AdRequestRepository {
    connection_pool: SqlitePool,
}

impl AdRequestRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn list_by_provider(&self, provider_id: i64) -> Result<Vec<AdRequest>, Error> {
        sqlx::query_as::<_, AdRequest>(
            "SELECT * FROM ad_requests WHERE provider_id = ? ORDER BY created_at DESC, ad_id DESC",
        )
        .bind(provider_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Stored status filter; `None` lists everything
    pub async fn list_by_status(&self, status: Option<AdStatus>) -> Result<Vec<AdRequest>, Error> {
        let mut query_builder = QueryBuilder::<Sqlite>::new("SELECT * FROM ad_requests");
        if let Some(status) = status {
            query_builder.push(" WHERE status = ").push_bind(status);
        }
        query_builder.push(" ORDER BY created_at ASC, ad_id ASC");
        query_builder
            .build_query_as::<AdRequest>()
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Ads that are live at `now`. Expiry is derived from `ends_at`, never stored.
    pub async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<AdRequest>, Error> {
        let ads = sqlx::query_as::<_, AdRequest>(
            "SELECT * FROM ad_requests WHERE status = ? ORDER BY starts_at DESC, ad_id DESC",
        )
        .bind(AdStatus::Active)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(ads
            .into_iter()
            .filter(|ad| ad.effective_status(now) == AdStatus::Active)
            .collect())
    }

    pub async fn count_pending(&self) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ad_requests WHERE status IN (?, ?)")
            .bind(AdStatus::PendingApproval)
            .bind(AdStatus::PaymentSubmitted)
            .fetch_one(&self.connection_pool)
            .await
    }

    /// Takes the ads of a deleted provider down: unpaid requests are rejected
    /// and live ads end at `now`. Returns the number of ads touched.
    #[instrument(skip(self))]
    pub async fn withdraw_by_provider(
        &self,
        provider_id: i64,
        now: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let rejected = sqlx::query(
            r#"
            UPDATE ad_requests SET status = ?, rejection_reason = ?, updated_at = ?
            WHERE provider_id = ? AND status IN (?, ?)
            "#,
        )
        .bind(AdStatus::Rejected)
        .bind("Account deleted")
        .bind(now)
        .bind(provider_id)
        .bind(AdStatus::PendingApproval)
        .bind(AdStatus::AwaitingPayment)
        .execute(&self.connection_pool)
        .await?;

        let ended = sqlx::query(
            r#"
            UPDATE ad_requests SET ends_at = ?, updated_at = ?
            WHERE provider_id = ? AND status = ?
            AND (ends_at IS NULL OR julianday(ends_at) > julianday(?))
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(provider_id)
        .bind(AdStatus::Active)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(rejected.rows_affected() + ended.rows_affected())
    }

    /// Compare-and-set status change, see `OrderRepository::transition`
    #[instrument(skip(self, data))]
    pub async fn transition(
        &self,
        ad_id: i64,
        expected: AdStatus,
        next: AdStatus,
        data: &AdTransitionDTO,
    ) -> Result<Option<AdRequest>, Error> {
        let mut query_builder = QueryBuilder::<Sqlite>::new("UPDATE ad_requests SET status = ");
        query_builder.push_bind(next);
        query_builder.push(", updated_at = ").push_bind(Utc::now());

        if let Some(amount) = data.amount {
            query_builder.push(", amount = ").push_bind(amount);
        }
        if let Some(ref receipt) = data.payment_receipt_url {
            query_builder
                .push(", payment_receipt_url = ")
                .push_bind(receipt.clone());
        }
        if let Some(ref reason) = data.rejection_reason {
            query_builder
                .push(", rejection_reason = ")
                .push_bind(reason.clone());
        }
        if let Some(starts_at) = data.starts_at {
            query_builder.push(", starts_at = ").push_bind(starts_at);
        }
        if let Some(ends_at) = data.ends_at {
            query_builder.push(", ends_at = ").push_bind(ends_at);
        }

        query_builder.push(" WHERE ad_id = ").push_bind(ad_id);
        query_builder.push(" AND status = ").push_bind(expected);
        query_builder.push(" RETURNING *");

        let ad = query_builder
            .build_query_as::<AdRequest>()
            .fetch_optional(&self.connection_pool)
            .await?;

        match &ad {
            Some(_) => info!("Ad {} moved from {:?} to {:?}", ad_id, expected, next),
            None => warn!("Ad {} was no longer {:?}", ad_id, expected),
        }
        Ok(ad)
    }
}

impl Create<AdRequest, CreateAdRequestDTO> for AdRequestRepository {
    #[instrument(skip(self, data), fields(provider_id = %data.provider_id))]
    async fn create(&self, data: &CreateAdRequestDTO) -> Result<AdRequest, Error> {
        let now = Utc::now();
        let ad = sqlx::query_as::<_, AdRequest>(
            r#"
            INSERT INTO ad_requests (provider_id, title, description, media_url, duration_days,
                                     status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.provider_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.media_url)
        .bind(data.duration_days)
        .bind(AdStatus::PendingApproval)
        .bind(now)
        .bind(now)
        .fetch_one(&self.connection_pool)
        .await?;

        info!("Ad request created with id {}", ad.ad_id);
        Ok(ad)
    }
}

impl Read<AdRequest, i64> for AdRequestRepository {
    async fn read(&self, id: &i64) -> Result<Option<AdRequest>, Error> {
        sqlx::query_as::<_, AdRequest>("SELECT * FROM ad_requests WHERE ad_id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
