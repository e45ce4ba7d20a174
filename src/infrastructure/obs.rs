//! OBS scene-text implementations of the `SceneText` port.
//!
//! The overlay is cosmetic, so everything here is fire-and-forget: updates
//! go through a channel into a worker task that owns the obs-websocket
//! connection, reconnects lazily, and logs-and-drops on any failure. The
//! coordinator is never blocked on OBS.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};
use uuid::Uuid;

use crate::common::config::ObsConfig;
use crate::domain::SceneText;

type ObsSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
enum ObsError {
    #[error("connection error: {0}")]
    Connect(String),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("obs-websocket requires authentication, which is not supported")]
    AuthRequired,
}

/// Used when OBS is not configured
pub struct NoopSceneText;

#[async_trait]
impl SceneText for NoopSceneText {
    async fn set_text(&self, _text: &str) {}
}

/// Scene-text updates over obs-websocket v5
pub struct ObsSceneText {
    tx: mpsc::UnboundedSender<String>,
}

impl ObsSceneText {
    /// Spawn the worker task owning the OBS connection
    pub fn spawn(config: ObsConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(scene_text_loop(config, rx));
        Self { tx }
    }
}

#[async_trait]
impl SceneText for ObsSceneText {
    async fn set_text(&self, text: &str) {
        if self.tx.send(text.to_string()).is_err() {
            tracing::warn!("OBS worker is gone, dropping scene text update");
        }
    }
}

/// Worker loop: connect on demand, push updates, drain OBS responses
async fn scene_text_loop(config: ObsConfig, mut rx: mpsc::UnboundedReceiver<String>) {
    let mut conn: Option<ObsSocket> = None;

    loop {
        conn = match conn.take() {
            None => {
                let Some(text) = rx.recv().await else { break };
                match obs_connect(&config.url).await {
                    Ok(ws) => send_update(ws, &config.source, &text).await,
                    Err(e) => {
                        tracing::warn!("OBS unavailable, dropping scene text update: {}", e);
                        None
                    }
                }
            }
            Some(mut ws) => {
                tokio::select! {
                    update = rx.recv() => match update {
                        None => break,
                        Some(text) => send_update(ws, &config.source, &text).await,
                    },
                    inbound = ws.next() => match inbound {
                        // RequestResponse frames are drained and ignored
                        Some(Ok(_)) => Some(ws),
                        _ => {
                            tracing::debug!("OBS connection closed");
                            None
                        }
                    },
                }
            }
        };
    }
}

async fn send_update(mut ws: ObsSocket, source: &str, text: &str) -> Option<ObsSocket> {
    let request = set_input_settings_request(source, text);
    match ws.send(Message::Text(request.into())).await {
        Ok(_) => Some(ws),
        Err(e) => {
            tracing::warn!("OBS send failed, dropping connection: {}", e);
            None
        }
    }
}

/// Connect and run the obs-websocket v5 handshake (Hello → Identify →
/// Identified). Password-protected instances are rejected.
async fn obs_connect(url: &str) -> Result<ObsSocket, ObsError> {
    let (mut ws, _response) = connect_async(url)
        .await
        .map_err(|e| ObsError::Connect(e.to_string()))?;

    let hello = read_json(&mut ws).await?;
    if hello["op"] != 0 {
        return Err(ObsError::Handshake(format!("expected Hello, got {}", hello)));
    }
    if hello["d"].get("authentication").is_some() {
        return Err(ObsError::AuthRequired);
    }

    let identify = serde_json::json!({ "op": 1, "d": { "rpcVersion": 1 } });
    ws.send(Message::Text(identify.to_string().into()))
        .await
        .map_err(|e| ObsError::Handshake(e.to_string()))?;

    let identified = read_json(&mut ws).await?;
    if identified["op"] != 2 {
        return Err(ObsError::Handshake(format!(
            "expected Identified, got {}",
            identified
        )));
    }

    tracing::info!("Connected to obs-websocket at {}", url);
    Ok(ws)
}

async fn read_json(ws: &mut ObsSocket) -> Result<serde_json::Value, ObsError> {
    let frame = tokio::time::timeout(HANDSHAKE_TIMEOUT, ws.next())
        .await
        .map_err(|_| ObsError::Handshake("timed out waiting for frame".to_string()))?;
    match frame {
        Some(Ok(Message::Text(text))) => {
            serde_json::from_str(&text).map_err(|e| ObsError::Handshake(e.to_string()))
        }
        Some(Ok(other)) => Err(ObsError::Handshake(format!("unexpected frame: {:?}", other))),
        Some(Err(e)) => Err(ObsError::Handshake(e.to_string())),
        None => Err(ObsError::Handshake("stream closed".to_string())),
    }
}

/// obs-websocket v5 `SetInputSettings` request (op 6) for a text source
fn set_input_settings_request(source: &str, text: &str) -> String {
    serde_json::json!({
        "op": 6,
        "d": {
            "requestType": "SetInputSettings",
            "requestId": Uuid::new_v4().to_string(),
            "requestData": {
                "inputName": source,
                "inputSettings": { "text": text }
            }
        }
    })
    .to_string()
}
