//! Relay server state.

use std::sync::Arc;

use crate::domain::RelayPusher;
use crate::usecase::CoordinatorHandle;

/// Shared application state
pub struct AppState {
    /// コーディネータへのコマンド送信ハンドル
    pub coordinator: CoordinatorHandle,
    /// RelayPusher（ゲームクライアントへの送信の抽象化）
    pub pusher: Arc<dyn RelayPusher>,
}
