//! Chat-to-game round coordinator process.
//!
//! Listens to Twitch chat for join commands, queues viewers and relays the
//! queue to game clients over WebSocket.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin coordinator
//! cargo run --bin coordinator -- --config coordinator.json --port 1949
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use yobidashi::{
    common::{config::Config, logger::setup_logger, time::SystemClock},
    domain::{ChatSink, SceneText},
    infrastructure::{
        chat::{TwitchChatSink, run_chat_client},
        obs::{NoopSceneText, ObsSceneText},
        relay_pusher::WebSocketRelayPusher,
        twitch_auth::{Credentials, TwitchAuth},
    },
    ui::{run_relay_server, state::AppState},
    usecase::{CoordinatorHandle, RoundCoordinator},
};

#[derive(Parser, Debug)]
#[command(name = "coordinator")]
#[command(about = "Chat-to-game round coordinator", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "coordinator.json")]
    config: PathBuf,

    /// Host address for the relay socket (overrides the config file)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port number for the relay socket (overrides the config file)
    #[arg(short = 'p', long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // On first run this writes a template config and fails, so the streamer
    // fills in credentials instead of the bot silently failing to log in
    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Chat credentials
    // 2. Ports (relay pusher, scene text, chat sink)
    // 3. Coordinator task
    // 4. Chat client task
    // 5. Relay server

    // 1. Resolve chat credentials (validate, refresh when possible).
    //    Failures degrade to the configured values; persisting refreshed
    //    tokens is the credential store's business.
    let auth = TwitchAuth::new();
    let credentials = match auth.ensure_credentials(&config.chat).await {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::warn!(
                "Could not validate the chat token ({}); using configured credentials as-is",
                e
            );
            Credentials {
                login: config.chat.username.clone(),
                token: config.chat.token.clone(),
            }
        }
    };

    // 2. Create the ports the coordinator acts through
    let relay_pusher = Arc::new(WebSocketRelayPusher::new());
    let scene: Arc<dyn SceneText> = match config.obs.clone() {
        Some(obs_config) => {
            tracing::info!("OBS scene text enabled for source '{}'", obs_config.source);
            Arc::new(ObsSceneText::spawn(obs_config))
        }
        None => Arc::new(NoopSceneText),
    };
    let (say_tx, say_rx) = mpsc::unbounded_channel();
    let chat_sink: Arc<dyn ChatSink> = Arc::new(TwitchChatSink::new(say_tx));

    // 3. Spawn the coordinator task (sole owner of queue and round state)
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let coordinator = RoundCoordinator::new(
        chat_sink,
        relay_pusher.clone(),
        scene,
        Arc::new(SystemClock),
    );
    tokio::spawn(coordinator.run(command_rx));
    let handle = CoordinatorHandle::new(command_tx);

    // 4. Spawn the chat client. Chat going offline never takes the relay
    //    down with it, so the game keeps its queue access either way.
    tokio::spawn(run_chat_client(
        config.chat.clone(),
        credentials,
        handle.clone(),
        say_rx,
    ));

    // 5. Run the relay server for game clients
    let state = Arc::new(AppState {
        coordinator: handle,
        pusher: relay_pusher,
    });
    let host = args.host.unwrap_or(config.relay.host);
    let port = args.port.unwrap_or(config.relay.port);
    if let Err(e) = run_relay_server(host, port, state).await {
        tracing::error!("Relay server error: {}", e);
        std::process::exit(1);
    }
}
