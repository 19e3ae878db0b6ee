//! AdRequest entity - Provider advertisement awaiting review and payment

use super::enums::AdStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct AdRequest {
    pub ad_id: i64,
    pub provider_id: i64,
    pub title: String,
    pub description: String,
    pub media_url: Option<String>,
    pub duration_days: i64,
    pub amount: Option<i64>,
    pub status: AdStatus,
    pub payment_receipt_url: Option<String>,
    pub rejection_reason: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdRequest {
    /// Stored status, except that an active ad past its end is reported as expired
    pub fn effective_status(&self, now: DateTime<Utc>) -> AdStatus {
        match (self.status, self.ends_at) {
            (AdStatus::Active, Some(ends_at)) if ends_at <= now => AdStatus::Expired,
            (status, _) => status,
        }
    }
}
