//! UseCase: ラウンドコーディネータ
//!
//! チャットイベントとリレーイベントを 1 本のコマンドチャンネルで受け取り、
//! プレイヤーキューとラウンド状態を単独で所有・更新するタスク。
//!
//! ## 不変条件
//!
//! - キューとラウンド状態を書き換えるのはこのタスクだけ（single writer）
//! - 状態の変更は送信（チャット返信・ブロードキャスト）より先に完了する
//! - 送信失敗はログに残すだけで、確定済みの変更を巻き戻さない

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::common::time::Clock;
use crate::domain::{
    ChatEvent, ChatSink, ConnectionId, PlayerEntry, PlayerQueue, QueuedPlayer, RelayPusher,
    RoundEvent, RoundState, SceneText, is_join_command,
};

use super::replies::{already_queued_reply, join_ack_reply};

/// コーディネータタスクへのコマンド
#[derive(Debug)]
pub enum CoordinatorCommand {
    /// チャットで受信したメッセージ
    Chat(ChatEvent),
    /// ゲームクライアントが新規接続した
    RelayConnected { conn_id: ConnectionId },
    /// ゲームクライアントからラウンドイベントを受信した
    RelayEvent {
        conn_id: ConnectionId,
        event: RoundEvent,
    },
    /// 現在のキュー状態の問い合わせ（非破壊の読み取り）
    QueueStatus {
        respond_to: oneshot::Sender<QueueStatus>,
    },
}

/// Read-only view of the coordinator state, for the HTTP surface
#[derive(Debug, Clone)]
pub struct QueueStatus {
    pub state: RoundState,
    pub players: Vec<QueuedPlayer>,
}

/// Cloneable sender facade over the coordinator's command channel
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<CoordinatorCommand>,
}

impl CoordinatorHandle {
    pub fn new(tx: mpsc::UnboundedSender<CoordinatorCommand>) -> Self {
        Self { tx }
    }

    pub fn chat_event(&self, event: ChatEvent) {
        self.send(CoordinatorCommand::Chat(event));
    }

    pub fn relay_connected(&self, conn_id: ConnectionId) {
        self.send(CoordinatorCommand::RelayConnected { conn_id });
    }

    pub fn relay_event(&self, conn_id: ConnectionId, event: RoundEvent) {
        self.send(CoordinatorCommand::RelayEvent { conn_id, event });
    }

    /// Query the current queue state. Returns `None` if the coordinator task
    /// has stopped.
    pub async fn queue_status(&self) -> Option<QueueStatus> {
        let (tx, rx) = oneshot::channel();
        if self
            .tx
            .send(CoordinatorCommand::QueueStatus { respond_to: tx })
            .is_err()
        {
            return None;
        }
        rx.await.ok()
    }

    fn send(&self, command: CoordinatorCommand) {
        if self.tx.send(command).is_err() {
            tracing::warn!("Coordinator task is gone, dropping command");
        }
    }
}

/// ラウンドコーディネータ
///
/// キューとラウンド状態を所有し、外部へはポート経由でのみ作用します。
pub struct RoundCoordinator {
    queue: PlayerQueue,
    state: RoundState,
    /// チャット返信の送信先（抽象化）
    chat: Arc<dyn ChatSink>,
    /// ゲームクライアントへの送信先（抽象化）
    relay: Arc<dyn RelayPusher>,
    /// シーンテキスト更新先（抽象化）
    scene: Arc<dyn SceneText>,
    clock: Arc<dyn Clock>,
}

impl RoundCoordinator {
    pub fn new(
        chat: Arc<dyn ChatSink>,
        relay: Arc<dyn RelayPusher>,
        scene: Arc<dyn SceneText>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            queue: PlayerQueue::new(),
            state: RoundState::NoRoundActive,
            chat,
            relay,
            scene,
            clock,
        }
    }

    /// Consume commands until every sender is dropped.
    ///
    /// Commands are processed strictly one at a time; a command's state
    /// mutation is complete before its outbound sends are awaited, and no
    /// other command can interleave.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<CoordinatorCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                CoordinatorCommand::Chat(event) => self.handle_chat(event).await,
                CoordinatorCommand::RelayConnected { conn_id } => {
                    self.handle_relay_connected(conn_id).await
                }
                CoordinatorCommand::RelayEvent { conn_id, event } => match event {
                    RoundEvent::BeginIntermission => {
                        self.handle_begin_intermission(conn_id).await
                    }
                    RoundEvent::BeginRound => self.handle_begin_round(conn_id).await,
                },
                CoordinatorCommand::QueueStatus { respond_to } => {
                    let _ = respond_to.send(QueueStatus {
                        state: self.state,
                        players: self.queue.entries().to_vec(),
                    });
                }
            }
        }
        tracing::info!("Coordinator stopped: all command senders dropped");
    }

    async fn handle_chat(&mut self, event: ChatEvent) {
        if !is_join_command(&event.text) {
            return;
        }
        if !self.state.accepts_joins() {
            // No round phase active: drop silently, no reply
            tracing::debug!(
                "Ignoring join from '{}': no round is active",
                event.sender.name
            );
            return;
        }

        let entry = PlayerEntry::from_chat_user(&event.sender);
        if self.queue.try_add(entry.clone(), self.clock.now_millis()) {
            tracing::info!(
                "'{}' queued for the round ({} in queue)",
                entry.name,
                self.queue.len()
            );

            // Queue mutation is committed; broadcast, then reply.
            if let Err(e) = self.relay.broadcast_player(&entry).await {
                tracing::warn!("Failed to broadcast new player '{}': {}", entry.name, e);
            }
            if let Some(reply) = join_ack_reply(self.state, &event.sender.name)
                && let Err(e) = self.chat.say(&event.channel, &reply).await
            {
                tracing::warn!("Failed to send chat reply to '{}': {}", event.sender.name, e);
            }
            self.update_scene().await;
        } else {
            tracing::debug!("'{}' is already queued", event.sender.name);
            if let Some(reply) = already_queued_reply(self.state, &event.sender.name)
                && let Err(e) = self.chat.say(&event.channel, &reply).await
            {
                tracing::warn!("Failed to send chat reply to '{}': {}", event.sender.name, e);
            }
        }
    }

    async fn handle_relay_connected(&mut self, conn_id: ConnectionId) {
        if self.queue.is_empty() {
            return;
        }
        // Catch-up is a non-mutating read, harmless to repeat
        if let Err(e) = self
            .relay
            .send_catchup(&conn_id, self.queue.peek_snapshot())
            .await
        {
            tracing::warn!("Failed to send catch-up to game client {}: {}", conn_id, e);
        }
    }

    async fn handle_begin_intermission(&mut self, conn_id: ConnectionId) {
        self.state = self.state.apply(RoundEvent::BeginIntermission);
        tracing::info!("Intermission started ({} in queue)", self.queue.len());

        if !self.queue.is_empty()
            && let Err(e) = self
                .relay
                .send_catchup(&conn_id, self.queue.peek_snapshot())
                .await
        {
            tracing::warn!("Failed to send catch-up to game client {}: {}", conn_id, e);
        }
        self.update_scene().await;
    }

    async fn handle_begin_round(&mut self, conn_id: ConnectionId) {
        self.state = self.state.apply(RoundEvent::BeginRound);
        let players = self.queue.drain_snapshot();
        tracing::info!("Sending lobby of {} players to game", players.len());

        // The lobby goes only to the requesting game client; the drain is
        // never rolled back even if the send fails.
        if let Err(e) = self.relay.send_lobby(&conn_id, players).await {
            tracing::warn!("Failed to send lobby to game client {}: {}", conn_id, e);
        }
        self.update_scene().await;
    }

    async fn update_scene(&self) {
        self.scene
            .set_text(&scene_caption(self.state, self.queue.len()))
            .await;
    }
}

/// Overlay caption shown in the stream scene
fn scene_caption(state: RoundState, queued: usize) -> String {
    match state {
        RoundState::NoRoundActive => String::new(),
        RoundState::Intermission => format!("!play to join - {} queued", queued),
        RoundState::InProgress => format!("round in progress - {} queued for next", queued),
    }
}
