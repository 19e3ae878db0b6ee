//! Entities module - Domain entities
//!
//! Every entity maps to one table. The `lifecycle` module holds the pure
//! status machines used by the services before anything is persisted.

pub mod ad_request;
pub mod call;
pub mod chat;
pub mod enums;
pub mod lifecycle;
pub mod message;
pub mod notification;
pub mod order;
pub mod portfolio;
pub mod rating;
pub mod support_request;
pub mod user;

// Re-exports
pub use ad_request::AdRequest;
pub use call::Call;
pub use chat::Chat;
pub use enums::{
    AdStatus, CallKind, CallStatus, NotificationKind, OrderStatus, PaymentStatus, SupportStatus,
    UserRole, VerificationStatus,
};
pub use lifecycle::{
    AdAction, CallAction, CallParty, OrderAction, Party, TransitionError, ad_transition,
    call_transition, order_transition, verification_review,
};
pub use message::Message;
pub use notification::Notification;
pub use order::Order;
pub use portfolio::PortfolioItem;
pub use rating::Rating;
pub use support_request::SupportRequest;
pub use user::{DELETED_USER_NAME, User};
