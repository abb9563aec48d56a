//! Error types for the chat client.

use kaiwa_shared::protocol::CodecError;
use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Username file could not be read or written
    #[error("Username store error: {0}")]
    UsernameStore(#[from] std::io::Error),
}

/// Reasons `ConnectionHook::submit_message` refuses to send.
///
/// The display strings are the user-visible error texts.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("WebSocket is not connected")]
    NotConnected,

    #[error("Message cannot be empty")]
    EmptyMessage,

    /// The message would be rejected by the server anyway
    #[error("{0}")]
    Invalid(#[from] CodecError),
}
