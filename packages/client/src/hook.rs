//! Connection hook: one outbound websocket, its lifecycle state and the display log.
//!
//! `ConnectionHook::connect` spawns the connection task and returns at once in
//! the `Connecting` state. State changes, received messages and errors are
//! published as `HookEvent`s for the view; the same data can be read back
//! through the accessor methods.
//!
//! ```text
//! Connecting ──open──▶ Open ──close/error──▶ Closed
//!     ▲                                        │
//!     └──────────── auto_reconnect ────────────┘
//! ```

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use kaiwa_shared::protocol::{ClientChatMessage, ServerChatMessage, decode_server_message, encode};
use tokio::{
    sync::{Mutex, mpsc, watch},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    domain::{ConnectionState, should_attempt_reconnect},
    error::SubmitError,
};

const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);
/// Shown when the server ends the connection
const CONNECTION_CLOSED_ERROR: &str = "WebSocket connection closed";

/// Connection hook configuration
#[derive(Debug, Clone)]
pub struct HookConfig {
    /// WebSocket URL, e.g. `ws://127.0.0.1:8080/ws`
    pub url: String,
    /// Reconnect after the connection closes
    pub auto_reconnect: bool,
    /// Delay before each reconnect attempt
    pub reconnect_interval: Duration,
    /// Consecutive attempts that fail to open before giving up
    pub max_reconnect_attempts: u32,
}

impl HookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auto_reconnect: false,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }

    pub fn with_auto_reconnect(mut self, auto_reconnect: bool) -> Self {
        self.auto_reconnect = auto_reconnect;
        self
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }
}

/// Notifications published to the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    StateChanged(ConnectionState),
    MessageReceived(ServerChatMessage),
    Error(String),
}

struct HookState {
    connection_state: ConnectionState,
    /// Display log, append-only
    messages: Vec<ServerChatMessage>,
    /// Last user-visible error
    error: Option<String>,
    /// Queue to the socket writer, present only while `Open`
    outbound: Option<mpsc::UnboundedSender<String>>,
}

/// State shared between the hook handle and the connection task
struct Shared {
    state: Mutex<HookState>,
    events: mpsc::UnboundedSender<HookEvent>,
}

impl Shared {
    fn emit(&self, event: HookEvent) {
        // Nobody listening is fine, the accessors still work
        let _ = self.events.send(event);
    }

    async fn open(&self, outbound: mpsc::UnboundedSender<String>) {
        {
            let mut state = self.state.lock().await;
            state.connection_state = ConnectionState::Open;
            state.outbound = Some(outbound);
            state.error = None;
        }
        self.emit(HookEvent::StateChanged(ConnectionState::Open));
    }

    async fn transition(&self, next: ConnectionState) {
        {
            let mut state = self.state.lock().await;
            if state.connection_state == next {
                return;
            }
            tracing::debug!(
                "Connection state {:?} -> {:?}",
                state.connection_state,
                next
            );
            state.connection_state = next;
            state.outbound = None;
        }
        self.emit(HookEvent::StateChanged(next));
    }

    async fn set_error(&self, error: String) {
        self.state.lock().await.error = Some(error.clone());
        self.emit(HookEvent::Error(error));
    }

    async fn append(&self, message: ServerChatMessage) {
        self.state.lock().await.messages.push(message.clone());
        self.emit(HookEvent::MessageReceived(message));
    }
}

/// Handle to one outbound chat connection.
///
/// Dropping the handle releases the connection.
pub struct ConnectionHook {
    shared: Arc<Shared>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ConnectionHook {
    /// Start connecting. Must be called inside a tokio runtime.
    pub fn connect(config: HookConfig) -> (Self, mpsc::UnboundedReceiver<HookEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            state: Mutex::new(HookState {
                connection_state: ConnectionState::Connecting,
                messages: Vec::new(),
                error: None,
                outbound: None,
            }),
            events: events_tx,
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(connection_loop(shared.clone(), config, shutdown_rx));

        let hook = Self {
            shared,
            shutdown: shutdown_tx,
            task: Some(task),
        };
        (hook, events_rx)
    }

    pub async fn state(&self) -> ConnectionState {
        self.shared.state.lock().await.connection_state
    }

    /// Snapshot of the display log
    pub async fn messages(&self) -> Vec<ServerChatMessage> {
        self.shared.state.lock().await.messages.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.shared.state.lock().await.error.clone()
    }

    /// Send a chat message.
    ///
    /// Returns as soon as the frame is queued; there is no delivery
    /// confirmation. On rejection the hook's error is set to the same text
    /// as the returned `SubmitError`.
    pub async fn submit_message(&self, username: &str, message: &str) -> Result<(), SubmitError> {
        let result = self.try_submit(username, message).await;
        if let Err(e) = &result {
            self.shared.set_error(e.to_string()).await;
        }
        result
    }

    async fn try_submit(&self, username: &str, message: &str) -> Result<(), SubmitError> {
        let outbound = {
            let state = self.shared.state.lock().await;
            match (state.connection_state, &state.outbound) {
                (ConnectionState::Open, Some(outbound)) => outbound.clone(),
                _ => return Err(SubmitError::NotConnected),
            }
        };

        if message.trim().is_empty() {
            return Err(SubmitError::EmptyMessage);
        }

        let chat = ClientChatMessage::new(username, message);
        chat.validate()?;
        let frame = encode(&chat)?;

        outbound
            .send(frame)
            .map_err(|_| SubmitError::NotConnected)
    }

    /// Close the connection and stop any reconnection. Ends in `Closed`.
    pub async fn close(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(mut task) = self.task.take()
            && tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await.is_err()
        {
            tracing::warn!("Connection task did not stop in time, aborting");
            task.abort();
        }
        self.shared.transition(ConnectionState::Closed).await;
    }
}

impl Drop for ConnectionHook {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Connect, run the session, and reconnect according to the policy
async fn connection_loop(
    shared: Arc<Shared>,
    config: HookConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut failed_attempts = 0;

    loop {
        shared.transition(ConnectionState::Connecting).await;
        tracing::info!("Connecting to {}", config.url);

        let opened = run_session(&shared, &config.url, &mut shutdown).await;
        shared.transition(ConnectionState::Closed).await;

        if *shutdown.borrow() {
            break;
        }

        failed_attempts = if opened { 0 } else { failed_attempts + 1 };
        if !should_attempt_reconnect(
            config.auto_reconnect,
            failed_attempts,
            config.max_reconnect_attempts,
        ) {
            if config.auto_reconnect {
                tracing::error!(
                    "Failed to reconnect after {} attempts",
                    config.max_reconnect_attempts
                );
            }
            break;
        }

        tracing::info!(
            "Reconnecting in {:?}... (attempt {}/{})",
            config.reconnect_interval,
            failed_attempts + 1,
            config.max_reconnect_attempts
        );
        tokio::select! {
            _ = tokio::time::sleep(config.reconnect_interval) => {}
            _ = shutdown.changed() => break,
        }
    }
}

/// Run one connection until it closes. Returns whether it reached `Open`.
async fn run_session(shared: &Shared, url: &str, shutdown: &mut watch::Receiver<bool>) -> bool {
    let connected = tokio::select! {
        result = connect_async(url) => result,
        _ = shutdown.changed() => return false,
    };

    let ws_stream = match connected {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            tracing::warn!("Failed to connect to {}: {}", url, e);
            shared.set_error(format!("WebSocket error: {}", e)).await;
            return false;
        }
    };

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    shared.open(outbound_tx).await;
    tracing::info!("Connected to chat server!");

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => match decode_server_message(text.as_str()) {
                    Ok(message) => shared.append(message).await,
                    Err(e) => tracing::warn!("Received invalid message: {} ({})", text.as_str(), e),
                },
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Server closed the connection");
                    shared.set_error(CONNECTION_CLOSED_ERROR.to_string()).await;
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    shared.set_error(format!("WebSocket error: {}", e)).await;
                    break;
                }
            },
            Some(frame) = outbound_rx.recv() => {
                if let Err(e) = write.send(Message::Text(frame.into())).await {
                    tracing::warn!("Failed to send message: {}", e);
                    shared.set_error(format!("WebSocket error: {}", e)).await;
                    break;
                }
            }
            _ = shutdown.changed() => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    tracing::debug!("Failed to send close frame: {}", e);
                }
                break;
            }
        }
    }

    true
}
