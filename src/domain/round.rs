//! Round lifecycle state machine.

/// Lifecycle state of the external game's rounds.
///
/// A single enum instead of independent booleans, so "neither" and "both"
/// round phases cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// Startup default: the game has not signaled readiness, joining is closed
    NoRoundActive,
    /// Pre-round phase, joining open for the upcoming round
    Intermission,
    /// A round is running, joining open for the *next* round
    InProgress,
}

impl RoundState {
    /// Whether join commands are currently accepted
    pub fn accepts_joins(self) -> bool {
        matches!(self, RoundState::Intermission | RoundState::InProgress)
    }

    /// Apply a game-client event. Transitions are total: either event moves
    /// the machine to its target state regardless of the prior state.
    pub fn apply(self, event: RoundEvent) -> RoundState {
        match event {
            RoundEvent::BeginIntermission => RoundState::Intermission,
            RoundEvent::BeginRound => RoundState::InProgress,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoundState::NoRoundActive => "no_round_active",
            RoundState::Intermission => "intermission",
            RoundState::InProgress => "in_progress",
        }
    }
}

/// Events received from the game client over the relay socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    BeginIntermission,
    BeginRound,
}

impl RoundEvent {
    /// Parse a wire event name. Unrecognized names yield `None` and are
    /// ignored by the relay, which doubles as protocol version tolerance.
    pub fn from_event_name(name: &str) -> Option<RoundEvent> {
        match name {
            "beginIntermission" => Some(RoundEvent::BeginIntermission),
            "beginRound" => Some(RoundEvent::BeginRound),
            _ => None,
        }
    }
}
