//! Order DTOs - Data Transfer Objects for orders, payments, disputes and ratings

use crate::entities::{Order, OrderStatus, PaymentStatus, Rating};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrderDTO {
    pub id: i64,
    pub seeker_id: i64,
    pub provider_id: i64,
    pub title: String,
    pub description: String,
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

impl From<Order> for OrderDTO {
    fn from(value: Order) -> Self {
        Self {
            id: value.order_id,
            seeker_id: value.seeker_id,
            provider_id: value.provider_id,
            title: value.title,
            description: value.description,
            amount: value.amount,
            status: value.status,
            payment_status: value.payment_status,
            payment_receipt_url: value.payment_receipt_url,
            payment_reference: value.payment_reference,
            decline_reason: value.decline_reason,
            dispute_reason: value.dispute_reason,
            disputed_by: value.disputed_by,
            resolution_note: value.resolution_note,
            grace_period_until: value.grace_period_until,
            scheduled_for: value.scheduled_for,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Body of a new order request
#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct OrderRequestDTO {
    pub provider_id: i64,

    #[validate(length(min = 3, max = 120, message = "Title must be between 3 and 120 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be between 1 and 5000 characters"))]
    pub description: String,

    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount: i64,

    pub scheduled_for: Option<DateTime<Utc>>,
}

/// DTO to create a new order (without order_id)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateOrderDTO {
    pub seeker_id: i64,
    pub provider_id: i64,
    pub title: String,
    pub description: String,
    pub amount: i64,
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Fields written together with a status change, only `Some` fields are touched
#[derive(Debug, Clone, Default)]
pub struct OrderTransitionDTO {
    pub payment_status: Option<PaymentStatus>,
    pub payment_receipt_url: Option<String>,
    pub payment_reference: Option<String>,
    pub decline_reason: Option<String>,
    pub dispute_reason: Option<String>,
    pub disputed_by: Option<i64>,
    pub resolution_note: Option<String>,
    pub grace_period_until: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct DeclineOrderDTO {
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct PaymentSubmissionDTO {
    #[validate(url(message = "Receipt must be a URL"))]
    pub receipt_url: String,

    #[validate(length(min = 1, max = 120, message = "Reference must be between 1 and 120 characters"))]
    pub reference: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct DisputeRequestDTO {
    #[validate(length(min = 10, max = 2000, message = "Reason must be between 10 and 2000 characters"))]
    pub reason: String,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct RatingRequestDTO {
    #[validate(range(min = 1, max = 5, message = "Stars must be between 1 and 5"))]
    pub stars: i64,

    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// DTO to create a rating (without rating_id)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateRatingDTO {
    pub order_id: i64,
    pub seeker_id: i64,
    pub provider_id: i64,
    pub stars: i64,
    pub comment: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RatingDTO {
    pub id: i64,
    pub order_id: i64,
    pub seeker_id: i64,
    pub stars: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Rating> for RatingDTO {
    fn from(value: Rating) -> Self {
        Self {
            id: value.rating_id,
            order_id: value.order_id,
            seeker_id: value.seeker_id,
            stars: value.stars,
            comment: value.comment,
            created_at: value.created_at,
        }
    }
}
