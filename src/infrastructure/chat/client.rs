//! Chat session management with reconnection support.
//!
//! Connects to Twitch chat (IRC over WebSocket), forwards PRIVMSG events to
//! the coordinator and writes outbound `say` lines from the sink channel.
//! The chat client never takes the relay down with it: when reconnection is
//! exhausted or authentication fails, chat goes offline and the relay keeps
//! serving the game client.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::common::config::ChatConfig;
use crate::domain::{ChatSendError, ChatSink};
use crate::infrastructure::twitch_auth::Credentials;
use crate::usecase::CoordinatorHandle;

use super::irc::{nick_from_prefix, parse_line, privmsg_to_event};

const TWITCH_CHAT_URL: &str = "wss://irc-ws.chat.twitch.tv:443";
const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Chat client errors
#[derive(Debug, Error)]
pub enum ChatError {
    /// Could not establish the WebSocket connection
    #[error("connection error: {0}")]
    Connect(String),

    /// The connection dropped mid-session
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The chat platform rejected the credentials
    #[error("login authentication failed")]
    AuthenticationFailed,

    /// A handshake or outbound write failed
    #[error("failed to send: {0}")]
    SendFailed(String),
}

/// Outbound chat interface backed by the live session's write channel
pub struct TwitchChatSink {
    tx: mpsc::UnboundedSender<String>,
}

impl TwitchChatSink {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ChatSink for TwitchChatSink {
    async fn say(&self, channel: &str, text: &str) -> Result<(), ChatSendError> {
        self.tx
            .send(format!("PRIVMSG #{} :{}", normalize_channel(channel), text))
            .map_err(|_| ChatSendError::ConnectionClosed)
    }
}

/// Channel names are lowercase and carry no leading '#' internally
fn normalize_channel(channel: &str) -> String {
    channel.trim().trim_start_matches('#').to_lowercase()
}

/// Run the chat client with reconnection logic.
///
/// Consumes `say_rx` (fed by [`TwitchChatSink`]) for outbound messages and
/// forwards inbound chat events to the coordinator.
pub async fn run_chat_client(
    config: ChatConfig,
    credentials: Credentials,
    coordinator: CoordinatorHandle,
    mut say_rx: mpsc::UnboundedReceiver<String>,
) {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Connecting to chat as '{}' (attempt {}/{})",
            credentials.login,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_chat_session(&config, &credentials, &coordinator, &mut say_rx).await {
            Ok(_) => {
                tracing::info!("Chat session ended normally");
                break;
            }
            Err(ChatError::AuthenticationFailed) => {
                tracing::error!(
                    "Chat login failed for '{}'; check the configured token. \
                     Chat is offline, the relay keeps running.",
                    credentials.login
                );
                break;
            }
            Err(e) => {
                tracing::warn!("Chat connection lost: {}", e);
                reconnect_count += 1;

                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect to chat after {} attempts. \
                         Chat is offline, the relay keeps running.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    break;
                }

                tracing::info!(
                    "Reconnecting to chat in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );
                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}

/// Run one chat session: handshake, then pump inbound lines and outbound says
async fn run_chat_session(
    config: &ChatConfig,
    credentials: &Credentials,
    coordinator: &CoordinatorHandle,
    say_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ChatError> {
    let (ws_stream, _response) = connect_async(TWITCH_CHAT_URL)
        .await
        .map_err(|e| ChatError::Connect(e.to_string()))?;

    let (mut write, mut read) = ws_stream.split();
    let channel = normalize_channel(&config.channel);

    // Login handshake; tags carry user-id and color on each message
    for line in [
        format!("PASS oauth:{}", credentials.token),
        format!("NICK {}", credentials.login),
        "CAP REQ :twitch.tv/tags twitch.tv/commands".to_string(),
        format!("JOIN #{}", channel),
    ] {
        write
            .send(Message::Text(line.into()))
            .await
            .map_err(|e| ChatError::SendFailed(e.to_string()))?;
    }

    loop {
        tokio::select! {
            inbound = read.next() => match inbound {
                None => return Err(ChatError::ConnectionLost("stream closed".to_string())),
                Some(Err(e)) => return Err(ChatError::ConnectionLost(e.to_string())),
                Some(Ok(Message::Text(text))) => {
                    for raw_line in text.lines() {
                        if let Some(response) =
                            handle_irc_line(raw_line, &credentials.login, coordinator)?
                        {
                            write
                                .send(Message::Text(response.into()))
                                .await
                                .map_err(|e| ChatError::SendFailed(e.to_string()))?;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    return Err(ChatError::ConnectionLost("server closed the connection".to_string()));
                }
                Some(Ok(_)) => {}
            },
            outbound = say_rx.recv() => match outbound {
                // Sink dropped: the process is shutting down
                None => return Ok(()),
                Some(line) => {
                    write
                        .send(Message::Text(line.into()))
                        .await
                        .map_err(|e| ChatError::SendFailed(e.to_string()))?;
                }
            },
        }
    }
}

/// Process one inbound IRC line. Returns a protocol response to write back
/// (PONG), or an error for lines that end the session.
fn handle_irc_line(
    raw_line: &str,
    own_login: &str,
    coordinator: &CoordinatorHandle,
) -> Result<Option<String>, ChatError> {
    let Some(line) = parse_line(raw_line) else {
        return Ok(None);
    };

    match line.command.as_str() {
        "PING" => {
            let token = line.params.first().map(String::as_str).unwrap_or("");
            return Ok(Some(format!("PONG :{}", token)));
        }
        "PRIVMSG" => {
            // Ignore our own messages
            let nick = line.prefix.as_deref().map(nick_from_prefix).unwrap_or("");
            if nick.eq_ignore_ascii_case(own_login) {
                return Ok(None);
            }
            if let Some(event) = privmsg_to_event(&line) {
                coordinator.chat_event(event);
            }
        }
        "001" => {
            tracing::info!("Connected to chat as '{}'", own_login);
        }
        "NOTICE" => {
            let notice = line.params.last().map(String::as_str).unwrap_or("");
            if notice.contains("Login authentication failed")
                || notice.contains("Improperly formatted auth")
            {
                return Err(ChatError::AuthenticationFailed);
            }
            tracing::debug!("Chat notice: {}", notice);
        }
        "RECONNECT" => {
            return Err(ChatError::ConnectionLost(
                "server requested reconnect".to_string(),
            ));
        }
        _ => {}
    }

    Ok(None)
}
