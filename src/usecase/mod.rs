//! UseCase 層
//!
//! チャットイベントとゲームクライアントイベントを単一のコーディネータ
//! タスクで処理します。キューとラウンド状態の書き込みはこのタスクだけが
//! 行うため、ロックなしで線形化可能性が保たれます。

mod coordinator;
mod replies;

pub use coordinator::{
    CoordinatorCommand, CoordinatorHandle, QueueStatus, RoundCoordinator,
};
pub use replies::{already_queued_reply, join_ack_reply};
