//! Rating entity - Seeker feedback on a completed order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Rating {
    pub rating_id: i64,
    pub order_id: i64,
    pub seeker_id: i64,
    pub provider_id: i64,
    pub stars: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
