//! Connection 実装
//!
//! - `websocket`: axum の WebSocket に紐づく mpsc ベースの実装

pub mod websocket;

pub use websocket::WebSocketConnection;
