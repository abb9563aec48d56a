//! Connection handle abstraction.
//!
//! The relay only needs to know whether a connection is open and how to hand
//! it a text frame, so the transport sits behind the `Connection` trait. The
//! websocket implementation lives in `infrastructure::connection`.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Server-assigned identifier of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random id (UUID v4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Transport lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closed,
}

/// Errors raised when handing a frame to a connection
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError {
    /// The connection is not in the `Open` state
    #[error("connection '{0}' is not open")]
    NotOpen(ConnectionId),

    /// The writer side of the connection has gone away
    #[error("connection '{0}' channel closed")]
    ChannelClosed(ConnectionId),
}

/// One open bidirectional channel, as seen by the registry and the relay
#[cfg_attr(test, mockall::automock)]
pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    fn ready_state(&self) -> ReadyState;

    /// Queue a text frame for delivery. Does not wait for the write.
    fn send_text(&self, frame: &str) -> Result<(), PushError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        // テスト項目: 生成される ConnectionId は毎回異なる
        // given (前提条件):
        let a = ConnectionId::generate();

        // when (操作):
        let b = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(a, b);
    }

    #[test]
    fn test_connection_id_display_is_uuid() {
        // テスト項目: ConnectionId の表示は UUID 文字列になる
        // given (前提条件):
        let id = ConnectionId::generate();

        // when (操作):
        let rendered = id.to_string();

        // then (期待する結果):
        assert_eq!(rendered, id.as_uuid().to_string());
        assert_eq!(rendered.len(), 36);
    }
}
