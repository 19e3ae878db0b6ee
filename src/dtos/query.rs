//! Query DTOs - Query string parameters

use crate::entities::{AdStatus, OrderStatus, SupportStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// /providers?category=..&location=..&search=..
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ProviderSearchQuery {
    pub category: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct AdListQuery {
    pub status: Option<AdStatus>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct SupportListQuery {
    pub status: Option<SupportStatus>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// Message pagination, newest first
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MessagesQuery {
    #[serde(default)]
    pub before: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl MessagesQuery {
    pub fn page_size(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}
