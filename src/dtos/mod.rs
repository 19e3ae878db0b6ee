//! DTOs module - Data Transfer Objects
//!
//! DTOs separate the API representation from the persisted entities.
//! `*RequestDTO` types are request bodies, `Create*DTO` types are repository inputs.

pub mod ad;
pub mod admin;
pub mod call;
pub mod chat;
pub mod notification;
pub mod order;
pub mod provider;
pub mod query;
pub mod support;
pub mod user;
pub mod ws_event;

// Re-exports
pub use ad::{AdApprovalDTO, AdDTO, AdPaymentDTO, AdRequestDTO, AdTransitionDTO, CreateAdRequestDTO};
pub use admin::{DashboardStatsDTO, DisputeOutcome, GracePeriodDTO, ReasonDTO, ResolveDisputeDTO};
pub use call::{CallDTO, CallRequestDTO, CreateCallDTO};
pub use chat::{ChatDTO, ChatRequestDTO, CreateChatDTO, CreateMessageDTO, MessageDTO, SendMessageDTO};
pub use notification::{CreateNotificationDTO, NotificationDTO};
pub use order::{
    CreateOrderDTO, CreateRatingDTO, DeclineOrderDTO, DisputeRequestDTO, OrderDTO,
    OrderRequestDTO, OrderTransitionDTO, PaymentSubmissionDTO, RatingDTO, RatingRequestDTO,
};
pub use provider::{
    CreatePortfolioItemDTO, PortfolioItemDTO, PortfolioItemRequestDTO, ProviderProfileDTO,
    ProviderRow, ProviderSummaryDTO,
};
pub use query::{
    AdListQuery, MessagesQuery, NotificationQuery, OrderListQuery, ProviderSearchQuery,
    SupportListQuery,
};
pub use support::{CreateSupportRequestDTO, SupportReplyDTO, SupportRequestDTO, SupportTicketDTO};
pub use user::{
    CreateUserDTO, LoginDTO, PublicUserDTO, RegisterRequestDTO, UpdateProfileDTO, UserDTO,
    VerificationRequestDTO,
};
pub use ws_event::WsEventDTO;
