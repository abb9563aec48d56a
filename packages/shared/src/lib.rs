//! Shared library for the Kaiwa broadcast chat.
//!
//! - `protocol`: JSON envelopes exchanged over the websocket and their validation rules
//! - `time`: clock abstraction and timestamp formatting
//! - `logger`: tracing subscriber setup used by both binaries

pub mod logger;
pub mod protocol;
pub mod time;
