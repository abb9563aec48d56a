//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement client rules
//! without side effects, making them easy to test.

/// Connection lifecycle as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    /// Indicator label
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "接続中",
            ConnectionState::Open => "接続済み",
            ConnectionState::Closed => "未接続",
        }
    }
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `auto_reconnect` - Whether the reconnect policy is enabled
/// * `failed_attempts` - Consecutive connection attempts that never reached `Open`
/// * `max_attempts` - The maximum number of consecutive failures allowed
pub fn should_attempt_reconnect(auto_reconnect: bool, failed_attempts: u32, max_attempts: u32) -> bool {
    auto_reconnect && failed_attempts < max_attempts
}

/// One line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// Send the line as a chat message
    Send(String),
    /// `/name <new>`
    Rename(String),
    /// `/quit`
    Quit,
    /// Blank line
    Empty,
}

/// Parse one input line.
///
/// Chat text is passed through untrimmed; the hook decides whether it is empty.
pub fn parse_input(line: &str) -> InputCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputCommand::Empty;
    }
    if trimmed == "/quit" {
        return InputCommand::Quit;
    }
    if let Some(rest) = trimmed.strip_prefix("/name")
        && (rest.is_empty() || rest.starts_with(char::is_whitespace))
    {
        return InputCommand::Rename(rest.trim().to_string());
    }
    InputCommand::Send(line.to_string())
}
