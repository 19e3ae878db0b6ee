//! Ad DTOs - Data Transfer Objects for advertisement requests

use crate::entities::{AdRequest, AdStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdDTO {
    pub id: i64,
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
}

impl AdDTO {
    /// Converts the entity, reporting lapsed ads as expired at `now`
    pub fn at(value: AdRequest, now: DateTime<Utc>) -> Self {
        let status = value.effective_status(now);
        Self {
            id: value.ad_id,
            provider_id: value.provider_id,
            title: value.title,
            description: value.description,
            media_url: value.media_url,
            duration_days: value.duration_days,
            amount: value.amount,
            status,
            payment_receipt_url: value.payment_receipt_url,
            rejection_reason: value.rejection_reason,
            starts_at: value.starts_at,
            ends_at: value.ends_at,
            created_at: value.created_at,
        }
    }
}

impl From<AdRequest> for AdDTO {
    fn from(value: AdRequest) -> Self {
        Self::at(value, Utc::now())
    }
}

/// Body of a new ad request
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct AdRequestDTO {
    #[validate(length(min = 3, max = 120, message = "Title must be between 3 and 120 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 2000, message = "Description must be between 1 and 2000 characters"))]
    pub description: String,

    #[validate(url(message = "Media must be a URL"))]
    pub media_url: Option<String>,

    #[validate(range(min = 1, max = 90, message = "Duration must be between 1 and 90 days"))]
    pub duration_days: i64,
}

/// DTO to create an ad request (without ad_id)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateAdRequestDTO {
    pub provider_id: i64,
    pub title: String,
    pub description: String,
    pub media_url: Option<String>,
    pub duration_days: i64,
}

/// Fields written together with a status change, only `Some` fields are touched
#[derive(Debug, Clone, Default)]
pub struct AdTransitionDTO {
    pub amount: Option<i64>,
    pub payment_receipt_url: Option<String>,
    pub rejection_reason: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct AdPaymentDTO {
    #[validate(url(message = "Receipt must be a URL"))]
    pub receipt_url: String,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct AdApprovalDTO {
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount: i64,
}
