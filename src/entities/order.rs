//! Order entity - A service engagement between a seeker and a provider

use super::enums::{OrderStatus, PaymentStatus};
use super::lifecycle::Party;
use super::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub order_id: i64,
    pub seeker_id: i64,
    pub provider_id: i64,
    pub title: String,
    pub description: String,
    /// smallest currency unit
    pub amount: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_receipt_url: Option<String>,
    pub payment_reference: Option<String>,
    pub decline_reason: Option<String>,
    pub dispute_reason: Option<String>,
    pub disputed_by: Option<i64>,
    pub resolution_note: Option<String>,
    pub grace_period_until: Option<DateTime<Utc>>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Role the user plays on this order, if any. Admins are recognised
    /// even when they are not a participant.
    pub fn party_of(&self, user: &User) -> Option<Party> {
        if user.user_id == self.seeker_id {
            Some(Party::Seeker)
        } else if user.user_id == self.provider_id {
            Some(Party::Provider)
        } else if user.is_admin() {
            Some(Party::Admin)
        } else {
            None
        }
    }

    /// The other participant relative to `user_id`
    pub fn counterpart_of(&self, user_id: i64) -> i64 {
        if user_id == self.seeker_id {
            self.provider_id
        } else {
            self.seeker_id
        }
    }
}
