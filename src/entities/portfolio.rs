//! PortfolioItem entity - Showcase entries of a provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct PortfolioItem {
    pub item_id: i64,
    pub provider_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
    pub created_at: DateTime<Utc>,
}
