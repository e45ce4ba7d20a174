//! WebSocket を使った RelayPusher 実装
//!
//! ## 責務
//!
//! - ゲームクライアント接続ごとの `UnboundedSender` を管理
//! - ドメイン型からワイヤフレーム（JSON）への変換と送信
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、フレーム送信に
//! 使用します。コーディネータはワイヤ形式を知りません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, PlayerEntry, PusherChannel, RelayPushError, RelayPusher};
use crate::infrastructure::dto::relay::RelayFrame;

/// WebSocket を使った RelayPusher 実装
pub struct WebSocketRelayPusher {
    /// 接続中のゲームクライアントの sender
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketRelayPusher {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }

    async fn push(&self, conn_id: &ConnectionId, frame: &RelayFrame) -> Result<(), RelayPushError> {
        let json = serde_json::to_string(frame)?;
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(conn_id) {
            sender
                .send(json)
                .map_err(|e| RelayPushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed frame to game client '{}'", conn_id);
            Ok(())
        } else {
            Err(RelayPushError::ClientNotFound(*conn_id))
        }
    }
}

impl Default for WebSocketRelayPusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelayPusher for WebSocketRelayPusher {
    async fn register(&self, conn_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(conn_id, sender);
        tracing::debug!("Game client '{}' registered to RelayPusher", conn_id);
    }

    async fn unregister(&self, conn_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(conn_id);
        tracing::debug!("Game client '{}' unregistered from RelayPusher", conn_id);
    }

    async fn send_catchup(
        &self,
        conn_id: &ConnectionId,
        players: Vec<PlayerEntry>,
    ) -> Result<(), RelayPushError> {
        self.push(conn_id, &RelayFrame::catchup(players)).await
    }

    async fn send_lobby(
        &self,
        conn_id: &ConnectionId,
        players: Vec<PlayerEntry>,
    ) -> Result<(), RelayPushError> {
        self.push(conn_id, &RelayFrame::lobby(players)).await
    }

    async fn broadcast_player(&self, player: &PlayerEntry) -> Result<(), RelayPushError> {
        let json = serde_json::to_string(&RelayFrame::player(player))?;
        let clients = self.clients.lock().await;

        for (conn_id, sender) in clients.iter() {
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = sender.send(json.clone()) {
                tracing::warn!(
                    "Failed to push player frame to game client '{}': {}",
                    conn_id,
                    e
                );
            } else {
                tracing::debug!("Broadcasted player frame to game client '{}'", conn_id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - WebSocketRelayPusher のフレーム送信機能
    // - send_catchup / send_lobby: 特定の接続への送信とワイヤ形式
    // - broadcast_player: 全接続へのファンアウト
    // - エラーハンドリング（存在しない接続）
    //
    // 【なぜこのテストが必要か】
    // - RelayPusher はコーディネータから呼ばれる通信層の中核
    // - ゲームクライアントが受け取る JSON の形はここで確定する
    //
    // 【どのようなシナリオをテストするか】
    // 1. 対象接続への送信成功と正確なワイヤ形式
    // 2. 存在しない接続への送信失敗
    // 3. K 個の接続へのブロードキャスト（1 接続 1 フレーム）
    // ========================================

    fn alice() -> PlayerEntry {
        PlayerEntry::new("alice".to_string(), "1".to_string(), "#fff".to_string())
    }

    async fn register_client(
        pusher: &WebSocketRelayPusher,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = ConnectionId::generate();
        pusher.register(conn_id, tx).await;
        (conn_id, rx)
    }

    #[tokio::test]
    async fn test_send_catchup_to_registered_client() {
        // テスト項目: 登録済みの接続にキャッチアップフレームが届く
        // given (前提条件):
        let pusher = WebSocketRelayPusher::new();
        let (conn_id, mut rx) = register_client(&pusher).await;

        // when (操作):
        let result = pusher.send_catchup(&conn_id, vec![alice()]).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            rx.recv().await.as_deref(),
            Some(r##"{"event":"catchup","players":[{"name":"alice","userId":"1","color":"#fff"}]}"##)
        );
    }

    #[tokio::test]
    async fn test_send_lobby_to_registered_client() {
        // テスト項目: 登録済みの接続に lobby フレームが届く
        // given (前提条件):
        let pusher = WebSocketRelayPusher::new();
        let (conn_id, mut rx) = register_client(&pusher).await;

        // when (操作):
        let result = pusher.send_lobby(&conn_id, vec![]).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            rx.recv().await.as_deref(),
            Some(r#"{"event":"lobby","players":[]}"#)
        );
    }

    #[tokio::test]
    async fn test_send_to_unknown_client_fails() {
        // テスト項目: 存在しない接続への送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketRelayPusher::new();
        let unknown = ConnectionId::generate();

        // when (操作):
        let result = pusher.send_lobby(&unknown, vec![alice()]).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RelayPushError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_broadcast_player_fans_out_to_all_clients() {
        // テスト項目: broadcast_player が全接続に 1 フレームずつ届く
        // given (前提条件):
        let pusher = WebSocketRelayPusher::new();
        let (_id1, mut rx1) = register_client(&pusher).await;
        let (_id2, mut rx2) = register_client(&pusher).await;
        let (_id3, mut rx3) = register_client(&pusher).await;

        // when (操作):
        let result = pusher.broadcast_player(&alice()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let expected =
            r##"{"event":"player","player":{"name":"alice","userId":"1","color":"#fff"}}"##;
        assert_eq!(rx1.recv().await.as_deref(), Some(expected));
        assert_eq!(rx2.recv().await.as_deref(), Some(expected));
        assert_eq!(rx3.recv().await.as_deref(), Some(expected));
        // 追加のフレームは届かない
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_tolerates_closed_receiver() {
        // テスト項目: 受信側が閉じた接続があってもブロードキャストは成功する
        // given (前提条件):
        let pusher = WebSocketRelayPusher::new();
        let (_id1, rx1) = register_client(&pusher).await;
        let (_id2, mut rx2) = register_client(&pusher).await;
        drop(rx1);

        // when (操作):
        let result = pusher.broadcast_player(&alice()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(rx2.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_unregister_removes_client() {
        // テスト項目: 登録解除した接続には送信できなくなる
        // given (前提条件):
        let pusher = WebSocketRelayPusher::new();
        let (conn_id, _rx) = register_client(&pusher).await;

        // when (操作):
        pusher.unregister(&conn_id).await;
        let result = pusher.send_catchup(&conn_id, vec![alice()]).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RelayPushError::ClientNotFound(_))));
    }
}
