//! WebSocket を使った Connection 実装
//!
//! ## 責務
//!
//! - 1 本の WebSocket 接続に対応する `UnboundedSender` と ready-state を保持
//! - 送信されたフレームを writer タスク（`ui::handler::websocket::pusher_loop`）へ受け渡す
//!
//! ソケット本体の読み書きは UI 層が行い、この型は送信キューの入口だけを持ちます。

use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::mpsc;

use crate::domain::{Connection, ConnectionId, PushError, ReadyState};

const CONNECTING: u8 = 0;
const OPEN: u8 = 1;
const CLOSED: u8 = 2;

/// Outbound queue of one websocket
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// WebSocket を使った Connection 実装
pub struct WebSocketConnection {
    id: ConnectionId,
    state: AtomicU8,
    sender: PusherChannel,
}

impl WebSocketConnection {
    /// Create a handle in the `Connecting` state
    pub fn new(id: ConnectionId, sender: PusherChannel) -> Self {
        Self {
            id,
            state: AtomicU8::new(CONNECTING),
            sender,
        }
    }

    pub fn mark_open(&self) {
        // Closed is terminal
        let _ = self
            .state
            .compare_exchange(CONNECTING, OPEN, Ordering::AcqRel, Ordering::Acquire);
    }

    pub fn mark_closed(&self) {
        self.state.store(CLOSED, Ordering::Release);
    }
}

impl Connection for WebSocketConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn ready_state(&self) -> ReadyState {
        // The writer task dropping its receiver means the socket is gone
        if self.sender.is_closed() {
            return ReadyState::Closed;
        }
        match self.state.load(Ordering::Acquire) {
            CONNECTING => ReadyState::Connecting,
            OPEN => ReadyState::Open,
            _ => ReadyState::Closed,
        }
    }

    fn send_text(&self, frame: &str) -> Result<(), PushError> {
        if self.ready_state() != ReadyState::Open {
            return Err(PushError::NotOpen(self.id));
        }
        self.sender
            .send(frame.to_string())
            .map_err(|_| PushError::ChannelClosed(self.id))?;
        tracing::trace!("Queued frame for connection '{}'", self.id);
        Ok(())
    }
}
