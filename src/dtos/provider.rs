//! Provider DTOs - Provider listings, profiles and portfolios

use crate::entities::{PortfolioItem, User, VerificationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Provider row enriched with its rating aggregate
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProviderRow {
    #[sqlx(flatten)]
    pub user: User,
    pub rating_average: Option<f64>,
    pub rating_count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProviderSummaryDTO {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub service_category: Option<String>,
    pub location: Option<String>,
    pub hourly_rate: Option<i64>,
    pub avatar_url: Option<String>,
    pub verification_status: VerificationStatus,
    pub rating_average: Option<f64>,
    pub rating_count: i64,
}

impl From<ProviderRow> for ProviderSummaryDTO {
    fn from(value: ProviderRow) -> Self {
        let user = value.user;
        Self {
            id: user.user_id,
            name: user.name,
            bio: user.bio,
            service_category: user.service_category,
            location: user.location,
            hourly_rate: user.hourly_rate,
            avatar_url: user.avatar_url,
            verification_status: user.verification_status,
            // rounded to one decimal like the stars shown in the app
            rating_average: value.rating_average.map(|avg| (avg * 10.0).round() / 10.0),
            rating_count: value.rating_count,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProviderProfileDTO {
    pub provider: ProviderSummaryDTO,
    pub portfolio: Vec<PortfolioItemDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PortfolioItemDTO {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<PortfolioItem> for PortfolioItemDTO {
    fn from(value: PortfolioItem) -> Self {
        Self {
            id: value.item_id,
            title: value.title,
            description: value.description,
            media_url: value.media_url,
            created_at: value.created_at,
        }
    }
}

/// Body of a new portfolio entry
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct PortfolioItemRequestDTO {
    #[validate(length(min = 1, max = 120, message = "Title must be between 1 and 120 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Media must be a URL"))]
    pub media_url: String,
}

/// DTO to create a portfolio item (without item_id)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreatePortfolioItemDTO {
    pub provider_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
}
