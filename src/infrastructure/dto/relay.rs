//! JSON frames exchanged with game clients on the relay socket.
//!
//! One JSON object per message, no batching. Inbound frames carry only an
//! `event` name; outbound frames are tagged by `event` and carry players.

use serde::{Deserialize, Serialize};

use crate::domain::PlayerEntry;

/// Wire shape of a queued player: `{"name", "userId", "color"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub name: String,
    pub user_id: String,
    pub color: String,
}

impl From<PlayerEntry> for PlayerDto {
    fn from(entry: PlayerEntry) -> Self {
        Self {
            name: entry.name,
            user_id: entry.user_id,
            color: entry.color,
        }
    }
}

impl From<&PlayerEntry> for PlayerDto {
    fn from(entry: &PlayerEntry) -> Self {
        entry.clone().into()
    }
}

/// Outbound frames (coordinator → game client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum RelayFrame {
    /// Queue snapshot for a newly connected or re-synchronizing client
    Catchup { players: Vec<PlayerDto> },
    /// Finalized player list for a starting round
    Lobby { players: Vec<PlayerDto> },
    /// A single newly queued player
    Player { player: PlayerDto },
}

impl RelayFrame {
    pub fn catchup(players: Vec<PlayerEntry>) -> Self {
        RelayFrame::Catchup {
            players: players.into_iter().map(PlayerDto::from).collect(),
        }
    }

    pub fn lobby(players: Vec<PlayerEntry>) -> Self {
        RelayFrame::Lobby {
            players: players.into_iter().map(PlayerDto::from).collect(),
        }
    }

    pub fn player(player: &PlayerEntry) -> Self {
        RelayFrame::Player {
            player: player.into(),
        }
    }
}

/// Inbound envelope (game client → coordinator).
///
/// Deserialization fails on non-JSON payloads and on a missing `event`
/// field; an unrecognized `event` value parses fine and is ignored upstream.
#[derive(Debug, Deserialize)]
pub struct RelayInbound {
    pub event: String,
}
