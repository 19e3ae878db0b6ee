//! WebSocket Module - Real-time push channel
//!
//! Every authenticated user may hold one socket. Business events
//! (notifications, new messages, call updates) are queued on the user's
//! channel in the [`usermap::UserMap`] and written out by a dedicated task.
//! Clients only send `{"type":"ping"}` keep-alives and close frames.

pub mod connection;
pub mod usermap;

pub use connection::handle_socket;

use crate::core::AppState;
use crate::entities::User;
use axum::{
    Extension,
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

/// Seconds without any client frame before the socket is dropped
pub const IDLE_TIMEOUT_SECONDS: u64 = 300;
/// Interval of server pings keeping intermediaries from closing idle sockets
pub const PING_INTERVAL_SECONDS: u64 = 30;

/// Upgrades the authenticated request to a WebSocket
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Response {
    let user_id = current_user.user_id;
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}
