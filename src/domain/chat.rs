//! チャットプラットフォームとのインターフェース
//!
//! ドメイン層はチャットの接続・認証を知らず、受信イベントと `say` の
//! インターフェースだけに依存します。具体的な実装（Twitch IRC）は
//! Infrastructure 層が提供します。

use async_trait::async_trait;
use thiserror::Error;

/// A message sender as seen by the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    /// Display/login name
    pub name: String,
    /// Stable platform user id, when the platform supplies one
    pub user_id: Option<String>,
    /// Chat name color, when set
    pub color: Option<String>,
}

/// An inbound chat message event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Channel the message was posted in (without the leading '#')
    pub channel: String,
    pub sender: ChatUser,
    pub text: String,
}

/// Chat send errors
#[derive(Debug, Error)]
pub enum ChatSendError {
    /// The chat connection (or its session task) is gone
    #[error("chat connection is closed")]
    ConnectionClosed,
}

/// Outbound chat interface (the `say` half of the chat platform)
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Post a message to the given channel
    async fn say(&self, channel: &str, text: &str) -> Result<(), ChatSendError>;
}
