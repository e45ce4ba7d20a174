//! HTTP API response DTOs.

use serde::Serialize;

use crate::common::time::timestamp_to_rfc3339;
use crate::usecase::QueueStatus;

/// One queued player, with the joined-at timestamp rendered for humans
#[derive(Debug, Serialize)]
pub struct QueuedPlayerDto {
    pub name: String,
    pub user_id: String,
    pub color: String,
    pub joined_at: String,
}

/// Response body of `GET /api/queue`
#[derive(Debug, Serialize)]
pub struct QueueStatusDto {
    pub state: String,
    pub players: Vec<QueuedPlayerDto>,
}

impl From<QueueStatus> for QueueStatusDto {
    fn from(status: QueueStatus) -> Self {
        Self {
            state: status.state.as_str().to_string(),
            players: status
                .players
                .into_iter()
                .map(|queued| QueuedPlayerDto {
                    name: queued.player.name,
                    user_id: queued.player.user_id,
                    color: queued.player.color,
                    joined_at: timestamp_to_rfc3339(queued.joined_at),
                })
                .collect(),
        }
    }
}
