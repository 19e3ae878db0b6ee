//! Khidmap server library - service marketplace between seekers and providers
//!
//! Exposes the modules and [`create_router`] so `main` and the integration
//! tests build the same application.

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod ws;

pub use crate::core::{AppError, AppState, Config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{any, delete, get, post},
};
use std::sync::Arc;

/// Builds the application router; every route lives under `/api`
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .nest("/auth", configure_auth_routes())
        .merge(configure_protected_routes(state.clone()));

    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .with_state(state)
}

/// Login, registration and logout need no token
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/logout", post(logout_user))
}

/// Every other route runs behind `authentication_middleware`
fn configure_protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::ws::ws_handler;

    Router::new()
        .nest("/users", configure_user_routes())
        .nest("/providers", configure_provider_routes())
        .nest("/orders", configure_order_routes())
        .nest("/ads", configure_ad_routes())
        .nest("/support", configure_support_routes())
        .nest("/chats", configure_chat_routes())
        .nest("/calls", configure_call_routes())
        .nest("/notifications", configure_notification_routes())
        .nest("/admin", configure_admin_routes())
        .route("/ws", any(ws_handler))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

fn configure_user_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/me", get(get_me).patch(update_me).delete(delete_me))
        .route("/me/verification", post(submit_verification))
        .route("/me/portfolio", post(add_portfolio_item))
        .route("/me/portfolio/{item_id}", delete(delete_portfolio_item))
}

fn configure_provider_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/", get(list_providers))
        .route("/{provider_id}", get(get_provider))
        .route("/{provider_id}/ratings", get(list_provider_ratings))
}

fn configure_order_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{order_id}", get(get_order))
        .route("/{order_id}/accept", post(accept_order))
        .route("/{order_id}/decline", post(decline_order))
        .route("/{order_id}/cancel", post(cancel_order))
        .route("/{order_id}/payment", post(submit_payment))
        .route("/{order_id}/start", post(start_order))
        .route("/{order_id}/complete", post(complete_order))
        .route("/{order_id}/dispute", post(dispute_order))
        .route("/{order_id}/rating", post(rate_order))
}

fn configure_ad_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/", post(create_ad))
        .route("/mine", get(list_my_ads))
        .route("/active", get(list_active_ads))
        .route("/{ad_id}/payment", post(submit_ad_payment))
}

fn configure_support_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/", get(list_my_tickets).post(create_ticket))
        .route("/{ticket_id}", get(get_ticket))
}

fn configure_chat_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/", get(list_chats).post(create_chat))
        .route(
            "/{chat_id}/messages",
            get(get_chat_messages).post(send_message),
        )
        .route("/{chat_id}/read", post(mark_chat_read))
}

fn configure_call_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/", get(list_calls).post(start_call))
        .route("/{call_id}/accept", post(accept_call))
        .route("/{call_id}/decline", post(decline_call))
        .route("/{call_id}/end", post(end_call))
}

fn configure_notification_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/", get(list_notifications))
        .route("/read-all", post(mark_all_notifications_read))
        .route("/{notification_id}/read", post(mark_notification_read))
}

/// Back-office, admins only. The admin gate runs after authentication
/// because the outer layer of the protected router wraps it.
fn configure_admin_routes() -> Router<Arc<AppState>> {
    use crate::core::admin_middleware;
    use crate::services::admin::*;

    Router::new()
        .route("/stats", get(dashboard_stats))
        .route("/payments", get(list_pending_payments))
        .route("/payments/{order_id}/approve", post(approve_payment))
        .route("/payments/{order_id}/reject", post(reject_payment))
        .route("/verifications", get(list_pending_verifications))
        .route("/verifications/{user_id}/approve", post(approve_verification))
        .route("/verifications/{user_id}/reject", post(reject_verification))
        .route("/ads", get(list_ads))
        .route("/ads/{ad_id}/approve", post(approve_ad))
        .route("/ads/{ad_id}/reject", post(reject_ad))
        .route("/ads/{ad_id}/confirm-payment", post(confirm_ad_payment))
        .route("/ads/{ad_id}/reject-payment", post(reject_ad_payment))
        .route("/disputes", get(list_disputes))
        .route("/disputes/{order_id}/resolve", post(resolve_dispute))
        .route("/disputes/{order_id}/grace-period", post(grant_grace_period))
        .route("/support", get(list_tickets))
        .route("/support/{ticket_id}/reply", post(reply_ticket))
        .layer(middleware::from_fn(admin_middleware))
}
