//! ゲームクライアントへの送信インターフェース
//!
//! コーディネータはワイヤ形式を知らず、ドメイン型で「何を送るか」だけを
//! 指示します。JSON フレームへの変換と WebSocket sender の管理は
//! Infrastructure 層の実装が担います（依存性の逆転）。

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::player::PlayerEntry;

/// Per-connection outbound message channel
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Identifier of one game-client relay connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Relay push errors
#[derive(Debug, Error)]
pub enum RelayPushError {
    /// The addressed game client is no longer connected
    #[error("game client '{0}' is not connected")]
    ClientNotFound(ConnectionId),

    /// The connection's channel rejected the message
    #[error("failed to push message: {0}")]
    PushFailed(String),

    /// Frame serialization failed
    #[error("failed to serialize frame: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outbound interface to connected game clients.
///
/// `send_catchup` / `send_lobby` address a single connection;
/// `broadcast_player` fans out to every connected client.
#[async_trait]
pub trait RelayPusher: Send + Sync {
    /// Register a newly connected game client
    async fn register(&self, conn_id: ConnectionId, sender: PusherChannel);

    /// Remove a disconnected game client
    async fn unregister(&self, conn_id: &ConnectionId);

    /// Send a catch-up snapshot of the queue to one connection
    async fn send_catchup(
        &self,
        conn_id: &ConnectionId,
        players: Vec<PlayerEntry>,
    ) -> Result<(), RelayPushError>;

    /// Send the drained lobby for a starting round to one connection
    async fn send_lobby(
        &self,
        conn_id: &ConnectionId,
        players: Vec<PlayerEntry>,
    ) -> Result<(), RelayPushError>;

    /// Announce a newly queued player to every connected game client
    async fn broadcast_player(&self, player: &PlayerEntry) -> Result<(), RelayPushError>;
}
