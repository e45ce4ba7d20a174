//! ドメイン層
//!
//! プレイヤーキュー・ラウンド状態機械といったコアのドメインモデルと、
//! 外部サービス（チャット・ゲームクライアント・シーンテキスト）への
//! インターフェースを定義します。具体的な実装は Infrastructure 層が
//! 提供します（依存性の逆転）。

mod chat;
mod command;
mod player;
mod pusher;
mod queue;
mod round;
mod scene;

pub use chat::{ChatEvent, ChatSendError, ChatSink, ChatUser};
pub use command::is_join_command;
pub use player::{PlayerEntry, QueuedPlayer};
pub use pusher::{ConnectionId, PusherChannel, RelayPushError, RelayPusher};
pub use queue::PlayerQueue;
pub use round::{RoundEvent, RoundState};
pub use scene::SceneText;

#[cfg(test)]
pub use scene::MockSceneText;
