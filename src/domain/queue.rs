//! The queue of players waiting for the next round.

use super::player::{PlayerEntry, QueuedPlayer};

/// Ordered, de-duplicated queue of players.
///
/// Insertion order is arrival order. No two entries share a `user_id`; the
/// insert path is the sole admission-control point. The queue is owned
/// exclusively by the coordinator task, so no locking is needed.
#[derive(Debug, Default)]
pub struct PlayerQueue {
    entries: Vec<QueuedPlayer>,
}

impl PlayerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a player unless their `user_id` is already queued.
    ///
    /// Returns `false` (and does not mutate) on a duplicate.
    pub fn try_add(&mut self, player: PlayerEntry, joined_at: i64) -> bool {
        if self
            .entries
            .iter()
            .any(|queued| queued.player.user_id == player.user_id)
        {
            return false;
        }
        self.entries.push(QueuedPlayer { player, joined_at });
        true
    }

    /// Return the queued players in arrival order and empty the queue in the
    /// same logical step. Used exactly once per round start.
    pub fn drain_snapshot(&mut self) -> Vec<PlayerEntry> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|queued| queued.player)
            .collect()
    }

    /// Return the queued players in arrival order without mutation.
    pub fn peek_snapshot(&self) -> Vec<PlayerEntry> {
        self.entries
            .iter()
            .map(|queued| queued.player.clone())
            .collect()
    }

    /// Queued players with their joined-at timestamps (read-only view)
    pub fn entries(&self) -> &[QueuedPlayer] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
