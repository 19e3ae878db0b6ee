//! Admin DTOs - Back-office review bodies and dashboard figures

use crate::entities::{OrderStatus, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct ReasonDTO {
    #[validate(length(min = 3, max = 1000, message = "Reason must be between 3 and 1000 characters"))]
    pub reason: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisputeOutcome {
    Seeker,
    Provider,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct ResolveDisputeDTO {
    pub in_favor_of: DisputeOutcome,

    #[validate(length(min = 3, max = 2000, message = "Note must be between 3 and 2000 characters"))]
    pub note: String,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct GracePeriodDTO {
    #[validate(range(min = 1, max = 30, message = "Grace period must be between 1 and 30 days"))]
    pub days: i64,

    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub note: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DashboardStatsDTO {
    pub users_by_role: BTreeMap<String, i64>,
    pub orders_by_status: BTreeMap<String, i64>,
    pub pending_payments: i64,
    pub pending_verifications: i64,
    pub pending_ads: i64,
    pub open_disputes: i64,
    pub open_tickets: i64,
}

impl DashboardStatsDTO {
    pub fn role_key(role: UserRole) -> String {
        enum_key(&role)
    }

    pub fn status_key(status: OrderStatus) -> String {
        enum_key(&status)
    }
}

// snake_case wire name of a unit enum variant
fn enum_key<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
