//! Kaiwa terminal chat client.
//!
//! `hook::ConnectionHook` owns the websocket connection and its state; the
//! runner renders hook events to the terminal and forwards typed lines.

pub mod domain;
pub mod error;
pub mod formatter;
pub mod hook;
pub mod runner;
pub mod username;

pub use runner::{ClientConfig, run_client};
