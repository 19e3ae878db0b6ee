//! Services module - HTTP handlers grouped by feature
//!
//! Handlers are thin: validate the body, check who is acting, run the pure
//! lifecycle function, persist through a repository and fire best-effort
//! notifications.

pub mod ad;
pub mod admin;
pub mod auth;
pub mod call;
pub mod chat;
pub mod notification;
pub mod order;
pub mod provider;
pub mod support;
pub mod user;

pub use ad::{create_ad, list_active_ads, list_my_ads, submit_ad_payment};
pub use auth::{login_user, logout_user, register_user};
pub use call::{accept_call, decline_call, end_call, list_calls, start_call};
pub use chat::{create_chat, get_chat_messages, list_chats, mark_chat_read, send_message};
pub use notification::{list_notifications, mark_all_notifications_read, mark_notification_read};
pub use order::{
    accept_order, cancel_order, complete_order, create_order, decline_order, dispute_order,
    get_order, list_orders, rate_order, start_order, submit_payment,
};
pub use provider::{get_provider, list_provider_ratings, list_providers};
pub use support::{create_ticket, get_ticket, list_my_tickets};
pub use user::{
    add_portfolio_item, delete_me, delete_portfolio_item, get_me, submit_verification, update_me,
};

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "khidmap" })),
    )
}
