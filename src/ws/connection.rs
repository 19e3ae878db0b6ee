//! WebSocket Connection Management - Writer and reader tasks of a socket

use crate::core::AppState;
use crate::dtos::WsEventDTO;
use crate::ws::{IDLE_TIMEOUT_SECONDS, PING_INTERVAL_SECONDS};
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, WeakUnboundedSender, unbounded_channel};
use tokio::sync::oneshot;
use tokio::time::{Duration, interval, timeout};
use tracing::{debug, error, info, instrument, warn};

#[instrument(skip(ws, state))]
pub async fn handle_socket(ws: WebSocket, state: Arc<AppState>, user_id: i64) {
    info!("WebSocket connection established");

    let (ws_tx, ws_rx) = ws.split();
    let (event_tx, event_rx) = unbounded_channel::<WsEventDTO>();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    // the map owns the only strong sender, replacing it closes this writer
    let weak_tx = event_tx.downgrade();
    state.users_online.register_online(user_id, event_tx);

    tokio::spawn(write_ws(user_id, ws_tx, event_rx, shutdown_rx));
    tokio::spawn(listen_ws(user_id, ws_rx, weak_tx, shutdown_tx, state));
}

/// Forwards queued events to the client and keeps the connection alive with pings
#[instrument(skip(websocket_tx, event_rx, shutdown_rx))]
pub async fn write_ws(
    user_id: i64,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    mut event_rx: UnboundedReceiver<WsEventDTO>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!("Write task started");

    let mut ping = interval(Duration::from_secs(PING_INTERVAL_SECONDS));
    ping.tick().await;

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    info!("Registration removed or replaced, closing socket");
                    break;
                };
                if send_event(&mut websocket_tx, &event).await.is_err() {
                    warn!("Failed to send event, closing connection");
                    break;
                }
            }

            _ = ping.tick() => {
                if websocket_tx.send(Message::Ping(Default::default())).await.is_err() {
                    warn!("Failed to send ping, closing connection");
                    break;
                }
            }

            _ = &mut shutdown_rx => {
                debug!("Reader finished, stopping writer");
                break;
            }
        }
    }

    let _ = websocket_tx.send(Message::Close(None)).await;
    debug!("Write task terminated");
}

pub(crate) async fn send_event(
    websocket_tx: &mut SplitSink<WebSocket, Message>,
    event: &WsEventDTO,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(|e| {
        error!("Failed to serialize event: {:?}", e);
        axum::Error::new(e)
    })?;
    websocket_tx.send(Message::Text(Utf8Bytes::from(json))).await
}

/// Reads client frames until close, error or idle timeout, then deregisters
#[instrument(skip(websocket_rx, event_tx, shutdown_tx, state))]
pub async fn listen_ws(
    user_id: i64,
    mut websocket_rx: SplitStream<WebSocket>,
    event_tx: WeakUnboundedSender<WsEventDTO>,
    shutdown_tx: oneshot::Sender<()>,
    state: Arc<AppState>,
) {
    debug!("Listen task started");
    let idle_timeout = Duration::from_secs(IDLE_TIMEOUT_SECONDS);

    loop {
        match timeout(idle_timeout, websocket_rx.next()).await {
            Ok(Some(Ok(msg))) => match msg {
                Message::Close(_) => {
                    info!("Close message received");
                    break;
                }
                Message::Text(text) => {
                    let Some(tx) = event_tx.upgrade() else {
                        debug!("Socket was replaced, ignoring client frame");
                        break;
                    };
                    let reply = if is_ping(&text) {
                        WsEventDTO::Pong
                    } else {
                        // the socket is push-only, writes go through the HTTP API
                        WsEventDTO::Error {
                            code: 400,
                            message: "Unsupported client event".to_string(),
                        }
                    };
                    let _ = tx.send(reply);
                }
                // pong replies to client pings are sent by the protocol layer
                _ => {}
            },
            Ok(Some(Err(e))) => {
                warn!("WebSocket error: {:?}", e);
                break;
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(timeout_secs = IDLE_TIMEOUT_SECONDS, "Connection timeout");
                break;
            }
        }
    }

    if let Some(tx) = event_tx.upgrade() {
        state.users_online.remove_from_online(user_id, &tx);
    }
    let _ = shutdown_tx.send(());
    debug!("Listen task terminated");
}

fn is_ping(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|value| value.get("type").and_then(|t| t.as_str()) == Some("ping"))
        .unwrap_or(false)
}
