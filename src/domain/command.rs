//! Chat join-command matching.

/// Accepted spellings of the join command
const JOIN_ALIASES: [&str; 3] = ["!play", "play", "! play"];

/// Whether a chat message is a join command.
///
/// Matching is case-insensitive and exact after trimming surrounding
/// whitespace; anything else is not this core's business.
pub fn is_join_command(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    JOIN_ALIASES.contains(&normalized.as_str())
}
