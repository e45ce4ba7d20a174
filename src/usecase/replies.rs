//! Chat reply composition for join requests.

use crate::domain::RoundState;

/// Welcome reply for a newly queued viewer.
///
/// Returns `None` when no round phase is active (no reply is sent at all).
pub fn join_ack_reply(state: RoundState, name: &str) -> Option<String> {
    match state {
        RoundState::Intermission => Some(format!("@{} joining this round :)", name)),
        RoundState::InProgress => Some(format!("@{} joining next round ResidentSleeper", name)),
        RoundState::NoRoundActive => None,
    }
}

/// Reply for a viewer who is already queued.
///
/// Returns `None` when no round phase is active (no reply is sent at all).
pub fn already_queued_reply(state: RoundState, name: &str) -> Option<String> {
    match state {
        RoundState::Intermission => Some(format!("@{} already in this round cmonBruh", name)),
        RoundState::InProgress => {
            Some(format!("@{} already queued for next round cmonBruh", name))
        }
        RoundState::NoRoundActive => None,
    }
}
