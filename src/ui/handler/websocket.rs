//! WebSocket connection handlers for game clients.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::domain::{ConnectionId, RoundEvent};
use crate::infrastructure::dto::relay::RelayInbound;

use super::super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx channel and pushes them to
/// the WebSocket sender.
///
/// This is the outbound half of a game-client connection: frames produced by
/// the coordinator (via the RelayPusher) are written to this client's socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = ConnectionId::generate();

    // Register the outbound channel before announcing the connection, so a
    // catch-up pushed by the coordinator cannot miss this client
    let (tx, rx) = mpsc::unbounded_channel();
    state.pusher.register(conn_id, tx).await;
    tracing::info!("Game client '{}' connected", conn_id);

    state.coordinator.relay_connected(conn_id);

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    let coordinator = state.coordinator.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on game client '{}': {}", conn_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from game client '{}': {}", conn_id, text);

                    // Validation happens before anything reaches the
                    // coordinator, so a bad payload cannot corrupt state
                    match serde_json::from_str::<RelayInbound>(&text) {
                        Ok(inbound) => match RoundEvent::from_event_name(&inbound.event) {
                            Some(event) => coordinator.relay_event(conn_id, event),
                            None => {
                                tracing::debug!(
                                    "Ignoring unrecognized event '{}' from game client '{}'",
                                    inbound.event,
                                    conn_id
                                );
                            }
                        },
                        Err(e) => {
                            tracing::warn!(
                                "Malformed payload from game client '{}', dropping connection: {}",
                                conn_id,
                                e
                            );
                            break;
                        }
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping from game client '{}'", conn_id);
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Game client '{}' requested close", conn_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.pusher.unregister(&conn_id).await;
    tracing::info!("Game client '{}' disconnected", conn_id);
}
