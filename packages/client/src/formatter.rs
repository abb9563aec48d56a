//! Message formatting utilities for client display.

use kaiwa_shared::{protocol::ServerChatMessage, time::to_jst_clock_time};

use crate::domain::ConnectionState;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the connection-state indicator
    ///
    /// # Returns
    ///
    /// A line such as `[● 接続済み]`
    pub fn format_state(state: ConnectionState) -> String {
        let marker = match state {
            ConnectionState::Connecting => "◌",
            ConnectionState::Open => "●",
            ConnectionState::Closed => "○",
        };
        format!("\n[{} {}]\n", marker, state.label())
    }

    /// Format a relayed chat message
    ///
    /// The timestamp is shown as JST wall-clock time. A timestamp that fails
    /// to parse is shown verbatim.
    pub fn format_chat_message(message: &ServerChatMessage) -> String {
        let time = message
            .parsed_timestamp()
            .map(to_jst_clock_time)
            .unwrap_or_else(|_| message.timestamp.clone());
        format!("\n[{}] {}: {}\n", time, message.username, message.message)
    }

    /// Format a user-visible error
    pub fn format_error(error: &str) -> String {
        format!("\nエラー: {}\n", error)
    }

    /// Shown when connected and nothing has been received yet
    pub fn format_empty_log() -> String {
        "\nメッセージがありません。最初のメッセージを送信しましょう！\n".to_string()
    }

    /// Format the username-changed notice
    pub fn format_username_changed(username: &str) -> String {
        format!("\nユーザー名を '{}' に変更しました\n", username)
    }
}
