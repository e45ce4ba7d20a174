//! Minimal IRC line parsing for the Twitch chat protocol.
//!
//! Twitch speaks IRCv3 over WebSocket: one or more lines per text frame,
//! each with optional `@key=value;...` tags, an optional `:prefix`, a
//! command, and parameters where the last one may be a `:`-trailing blob.

use std::collections::HashMap;

use crate::domain::{ChatEvent, ChatUser};

/// One parsed IRC line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcLine {
    pub tags: HashMap<String, String>,
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

/// Parse a single IRC line. Returns `None` for lines that are empty or too
/// malformed to carry a command.
pub fn parse_line(line: &str) -> Option<IrcLine> {
    let mut rest = line.trim_end_matches(['\r', '\n']);
    if rest.is_empty() {
        return None;
    }

    let mut tags = HashMap::new();
    if let Some(stripped) = rest.strip_prefix('@') {
        let (tag_part, after) = stripped.split_once(' ')?;
        for pair in tag_part.split(';') {
            match pair.split_once('=') {
                Some((key, value)) => {
                    tags.insert(key.to_string(), unescape_tag_value(value));
                }
                None => {
                    tags.insert(pair.to_string(), String::new());
                }
            }
        }
        rest = after;
    }

    let mut prefix = None;
    if let Some(stripped) = rest.strip_prefix(':') {
        let (p, after) = stripped.split_once(' ')?;
        prefix = Some(p.to_string());
        rest = after;
    }

    let (middle, trailing) = match rest.split_once(" :") {
        Some((middle, trailing)) => (middle, Some(trailing)),
        None => (rest, None),
    };

    let mut params: Vec<String> = middle.split_whitespace().map(str::to_string).collect();
    if params.is_empty() {
        return None;
    }
    let command = params.remove(0);
    if let Some(trailing) = trailing {
        params.push(trailing.to_string());
    }

    Some(IrcLine {
        tags,
        prefix,
        command,
        params,
    })
}

/// Undo IRCv3 tag-value escaping (`\s`, `\:`, `\\`, `\r`, `\n`)
fn unescape_tag_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => result.push(' '),
            Some(':') => result.push(';'),
            Some('\\') => result.push('\\'),
            Some('r') => result.push('\r'),
            Some('n') => result.push('\n'),
            Some(other) => result.push(other),
            None => {}
        }
    }
    result
}

/// Nick part of a `nick!user@host` prefix
pub fn nick_from_prefix(prefix: &str) -> &str {
    prefix.split('!').next().unwrap_or(prefix)
}

/// Turn a PRIVMSG line into a chat event. Returns `None` for other commands
/// or lines without a channel/text parameter.
pub fn privmsg_to_event(line: &IrcLine) -> Option<ChatEvent> {
    if line.command != "PRIVMSG" || line.params.len() < 2 {
        return None;
    }

    let nick = line.prefix.as_deref().map(nick_from_prefix)?;
    let name = match line.tags.get("display-name") {
        Some(display_name) if !display_name.is_empty() => display_name.clone(),
        _ => nick.to_string(),
    };
    let user_id = line.tags.get("user-id").filter(|id| !id.is_empty()).cloned();
    let color = line.tags.get("color").filter(|c| !c.is_empty()).cloned();

    Some(ChatEvent {
        channel: line.params[0].trim_start_matches('#').to_string(),
        sender: ChatUser {
            name,
            user_id,
            color,
        },
        text: line.params[1].clone(),
    })
}
