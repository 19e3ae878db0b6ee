//! Enumerations - Enumerated types stored as snake_case text

use serde::{Deserialize, Serialize};

// ********************* ENUMERATIONS **********************//

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Seeker,
    Provider,
    Admin,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
    Rejected,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingApproval,
    PendingPayment,
    Paid,
    InProgress,
    Completed,
    Disputed,
    Declined,
    Cancelled,
    Refunded,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Submitted,
    Verified,
    Rejected,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdStatus {
    PendingApproval,
    AwaitingPayment,
    PaymentSubmitted,
    Active,
    Rejected,
    Expired,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SupportStatus {
    Open,
    Resolved,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Voice,
    Video,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Ringing,
    Ongoing,
    Declined,
    Missed,
    Ended,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Order,
    Payment,
    Verification,
    Ad,
    Support,
    Call,
    System,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::PendingApproval,
        OrderStatus::PendingPayment,
        OrderStatus::Paid,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Disputed,
        OrderStatus::Declined,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    /// No action leads out of these statuses
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed
                | OrderStatus::Declined
                | OrderStatus::Cancelled
                | OrderStatus::Refunded
        )
    }

    /// Work has been paid for and is not settled yet
    pub fn is_engaged(self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::InProgress | OrderStatus::Disputed
        )
    }
}
