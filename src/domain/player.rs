//! Player entries queued for a round.

use super::chat::ChatUser;

/// Fallback when the chat platform supplies no color tag
const DEFAULT_COLOR: &str = "#FFFFFF";

/// A viewer queued for a round, as handed to the game client.
///
/// Immutable once created; entries are only ever appended to the queue or
/// removed as part of a full-queue drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntry {
    /// Display name shown in the game lobby
    pub name: String,
    /// Stable platform user id; identity key for de-duplication
    pub user_id: String,
    /// Chat name color, hex string
    pub color: String,
}

impl PlayerEntry {
    pub fn new(name: String, user_id: String, color: String) -> Self {
        Self {
            name,
            user_id,
            color,
        }
    }

    /// Build an entry from a chat sender.
    ///
    /// The stable platform id is the identity key; when the platform supplies
    /// none, the login name stands in so de-duplication still works.
    pub fn from_chat_user(user: &ChatUser) -> Self {
        Self {
            name: user.name.clone(),
            user_id: user
                .user_id
                .clone()
                .unwrap_or_else(|| user.name.clone()),
            color: user
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        }
    }
}

/// A queue entry together with the time the viewer joined (Unix millis).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedPlayer {
    pub player: PlayerEntry,
    pub joined_at: i64,
}
