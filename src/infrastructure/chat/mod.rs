//! Twitch IRC-over-WebSocket chat client.

mod client;
mod irc;

pub use client::{ChatError, TwitchChatSink, run_chat_client};
