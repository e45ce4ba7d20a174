//! Integration tests for the round coordinator using process-based testing.
//!
//! Each test writes a config file, spawns the compiled `coordinator` binary
//! and talks to its relay socket like a real game client would. Chat stays
//! offline in every test (the dummy token cannot authenticate); the relay
//! must serve regardless.

use std::fs;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

type GameClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(30);
const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper struct to manage coordinator process lifecycle
struct TestCoordinator {
    process: Child,
    config_path: PathBuf,
    port: u16,
}

impl TestCoordinator {
    /// Write a config with dummy credentials and start a coordinator whose
    /// relay listens on the given port
    async fn start(port: u16) -> Self {
        let config_path = test_config_path(port);
        let config = serde_json::json!({
            "chat": {
                "username": "testbot",
                "token": "dummytoken",
                "channel": "testchannel"
            },
            "relay": { "host": "127.0.0.1", "port": port }
        });
        fs::write(&config_path, config.to_string()).expect("Failed to write test config");

        let process = Command::new("cargo")
            .args([
                "run",
                "--bin",
                "coordinator",
                "--",
                "--config",
                config_path.to_str().unwrap(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to start coordinator");

        let coordinator = TestCoordinator {
            process,
            config_path,
            port,
        };
        coordinator.wait_until_ready().await;
        coordinator
    }

    /// Poll the relay port until it accepts TCP connections
    async fn wait_until_ready(&self) {
        let deadline = tokio::time::Instant::now() + STARTUP_TIMEOUT;
        loop {
            if TcpStream::connect(("127.0.0.1", self.port)).await.is_ok() {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "Coordinator did not open port {} within {:?}",
                self.port,
                STARTUP_TIMEOUT
            );
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    fn api_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}/api/{}", self.port, path)
    }

    /// Connect a game client to the relay socket
    async fn connect_game_client(&self) -> GameClient {
        let (ws, _response) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect game client");
        ws
    }
}

impl Drop for TestCoordinator {
    fn drop(&mut self) {
        // Kill the coordinator process when the test ends
        let _ = self.process.kill();
        let _ = self.process.wait();
        let _ = fs::remove_file(&self.config_path);
    }
}

fn test_config_path(port: u16) -> PathBuf {
    std::env::temp_dir().join(format!("yobidashi-test-{}.json", port))
}

/// Send a `{"event": ...}` frame to the relay
async fn send_event(game: &mut GameClient, event: &str) {
    game.send(Message::Text(
        format!(r#"{{"event":"{}"}}"#, event).into(),
    ))
    .await
    .expect("Failed to send event frame");
}

/// Read the next text frame as JSON, failing the test on timeout or close
async fn read_frame(game: &mut GameClient) -> serde_json::Value {
    loop {
        let frame = tokio::time::timeout(FRAME_TIMEOUT, game.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Stream closed while waiting for a frame")
            .expect("WebSocket error while waiting for a frame");
        match frame {
            Message::Text(text) => {
                return serde_json::from_str(&text).expect("Frame is not valid JSON");
            }
            // Skip protocol frames
            _ => continue,
        }
    }
}

#[test]
fn test_first_run_writes_template_and_exits() {
    // テスト項目: 設定ファイルが無い初回起動でテンプレートを書いて異常終了する
    // given (前提条件):
    let config_path = std::env::temp_dir().join("yobidashi-test-bootstrap.json");
    let _ = fs::remove_file(&config_path);

    // when (操作):
    let output = Command::new("cargo")
        .args([
            "run",
            "--bin",
            "coordinator",
            "--",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run coordinator");

    // then (期待する結果):
    assert!(
        !output.status.success(),
        "First run without a config file must exit with a failure status"
    );
    assert!(config_path.exists(), "A template config must be written");

    // テンプレートは空の認証情報を持つ有効な JSON
    let template: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(template["chat"]["username"], "");
    assert_eq!(template["chat"]["token"], "");
    assert_eq!(template["chat"]["channel"], "");

    fs::remove_file(&config_path).ok();
}

#[test]
fn test_unfilled_template_is_rejected() {
    // テスト項目: テンプレートのまま（空の認証情報）の再起動も異常終了する
    // given (前提条件):
    let config_path = std::env::temp_dir().join("yobidashi-test-empty-creds.json");
    let _ = fs::remove_file(&config_path);

    // 初回起動でテンプレートを作らせる
    let first = Command::new("cargo")
        .args([
            "run",
            "--bin",
            "coordinator",
            "--",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run coordinator");
    assert!(!first.status.success());

    // when (操作): テンプレートを埋めずにもう一度起動する
    let second = Command::new("cargo")
        .args([
            "run",
            "--bin",
            "coordinator",
            "--",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run coordinator");

    // then (期待する結果):
    assert!(
        !second.status.success(),
        "Empty credentials must be fatal at startup"
    );

    fs::remove_file(&config_path).ok();
}

#[tokio::test]
async fn test_round_lifecycle_over_relay() {
    // テスト項目: 接続 → beginIntermission → beginRound で空の lobby が届く
    // given (前提条件):
    let coordinator = TestCoordinator::start(19491).await;
    let mut game = coordinator.connect_game_client().await;

    // when (操作): キューが空なので beginIntermission ではキャッチアップが届かない
    send_event(&mut game, "beginIntermission").await;
    send_event(&mut game, "beginRound").await;

    // then (期待する結果): 空の lobby が要求元に届く
    let frame = read_frame(&mut game).await;
    assert_eq!(frame["event"], "lobby");
    assert_eq!(frame["players"], serde_json::json!([]));

    // HTTP 側からもラウンド進行中が観測できる
    let status: serde_json::Value = reqwest::get(coordinator.api_url("queue"))
        .await
        .expect("Failed to query /api/queue")
        .json()
        .await
        .expect("Queue status is not JSON");
    assert_eq!(status["state"], "in_progress");
    assert_eq!(status["players"], serde_json::json!([]));
}

#[tokio::test]
async fn test_lobby_goes_only_to_the_requester() {
    // テスト項目: lobby は beginRound を送った接続にだけ届く
    // given (前提条件):
    let coordinator = TestCoordinator::start(19492).await;
    let mut game_a = coordinator.connect_game_client().await;
    let mut game_b = coordinator.connect_game_client().await;

    // when (操作):
    send_event(&mut game_a, "beginRound").await;

    // then (期待する結果):
    let frame = read_frame(&mut game_a).await;
    assert_eq!(frame["event"], "lobby");

    // 要求していない接続には何も届かない
    let nothing = tokio::time::timeout(Duration::from_millis(500), game_b.next()).await;
    assert!(
        nothing.is_err(),
        "Non-requesting client must not receive the lobby"
    );
}

#[tokio::test]
async fn test_unknown_event_is_ignored() {
    // テスト項目: 未知のイベントでは接続が維持され、応答も状態遷移も無い
    // given (前提条件):
    let coordinator = TestCoordinator::start(19493).await;
    let mut game = coordinator.connect_game_client().await;

    // when (操作):
    send_event(&mut game, "somethingNew").await;

    // then (期待する結果): 接続が生きていることを beginRound への応答で確認する
    send_event(&mut game, "beginRound").await;
    let frame = read_frame(&mut game).await;
    assert_eq!(frame["event"], "lobby");
}

#[tokio::test]
async fn test_malformed_payload_drops_the_connection() {
    // テスト項目: 不正なペイロードでその接続だけが切断され、プロセスは生き続ける
    // given (前提条件):
    let coordinator = TestCoordinator::start(19494).await;
    let mut game = coordinator.connect_game_client().await;

    // when (操作):
    game.send(Message::Text("this is not json".into()))
        .await
        .expect("Failed to send malformed payload");

    // then (期待する結果): サーバー側が接続を閉じる
    let closed = tokio::time::timeout(FRAME_TIMEOUT, async {
        loop {
            match game.next().await {
                None | Some(Ok(Message::Close(_))) | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(
        closed.is_ok(),
        "Server must close the connection on a malformed payload"
    );

    // 新しい接続は引き続き受け付けられる
    let mut replacement = coordinator.connect_game_client().await;
    send_event(&mut replacement, "beginRound").await;
    let frame = read_frame(&mut replacement).await;
    assert_eq!(frame["event"], "lobby");
}

#[tokio::test]
async fn test_http_surface() {
    // テスト項目: /api/health と /api/queue が起動直後から応答する
    // given (前提条件):
    let coordinator = TestCoordinator::start(19495).await;

    // when (操作):
    let health: serde_json::Value = reqwest::get(coordinator.api_url("health"))
        .await
        .expect("Failed to query /api/health")
        .json()
        .await
        .expect("Health response is not JSON");

    let queue: serde_json::Value = reqwest::get(coordinator.api_url("queue"))
        .await
        .expect("Failed to query /api/queue")
        .json()
        .await
        .expect("Queue status is not JSON");

    // then (期待する結果):
    assert_eq!(health["status"], "ok");
    assert_eq!(queue["state"], "no_round_active");
    assert_eq!(queue["players"], serde_json::json!([]));
}
