//! WebSocket message envelopes shared by the server and the client.
//!
//! ## Frames
//!
//! - Client → Server: `{"type":"chat","username":"...","message":"..."}`
//! - Server → Client: `{"type":"chat","username":"...","message":"...","timestamp":"..."}`
//!
//! A `join` envelope is part of the vocabulary but the relay never dispatches it.
//!
//! Lengths are counted in Unicode scalar values, so `"匿名"` has length 2.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{format_timestamp, parse_timestamp};

/// Maximum username length (UTF-16 code units)
pub const USERNAME_MAX_LEN: usize = 50;

/// Maximum message length (UTF-16 code units)
pub const MESSAGE_MAX_LEN: usize = 500;

/// Errors raised while decoding or validating an envelope
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is not JSON or does not have the envelope shape
    #[error("invalid JSON frame: {0}")]
    InvalidJson(serde_json::Error),

    /// The `type` discriminant is missing or not accepted here
    #[error("unsupported message type: '{0}'")]
    UnsupportedType(String),

    /// Username length outside 1..=50
    #[error("username must be 1-{max} characters (got {0})", max = USERNAME_MAX_LEN)]
    UsernameLength(usize),

    /// Message length outside 1..=500
    #[error("message must be 1-{max} characters (got {0})", max = MESSAGE_MAX_LEN)]
    MessageLength(usize),

    /// Timestamp is not a valid RFC 3339 date
    #[error("invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    /// Encoding failed
    #[error("failed to serialize message: {0}")]
    Serialize(serde_json::Error),
}

/// Envelope discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Chat,
    Join,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Chat => "chat",
            MessageType::Join => "join",
        }
    }
}

/// Client → Server chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientChatMessage {
    pub r#type: MessageType,
    /// Absent usernames decode as empty so the relay can apply its username policy
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub message: String,
}

impl ClientChatMessage {
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            r#type: MessageType::Chat,
            username: username.into(),
            message: message.into(),
        }
    }

    pub fn validate(&self) -> Result<(), CodecError> {
        expect_type(self.r#type, MessageType::Chat)?;
        validate_username(&self.username)?;
        validate_message(&self.message)
    }
}

/// Client → Server join message (declared, never dispatched by the relay)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientJoinMessage {
    pub r#type: MessageType,
    #[serde(default)]
    pub username: String,
}

impl ClientJoinMessage {
    pub fn validate(&self) -> Result<(), CodecError> {
        expect_type(self.r#type, MessageType::Join)?;
        validate_username(&self.username)
    }
}

/// Any frame a client may send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    Chat(ClientChatMessage),
    Join(ClientJoinMessage),
}

/// Server → Client chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerChatMessage {
    pub r#type: MessageType,
    pub username: String,
    pub message: String,
    /// ISO-8601 (RFC 3339) timestamp assigned by the server
    pub timestamp: String,
}

impl ServerChatMessage {
    /// Stamp a client message with the time it was relayed
    pub fn stamp(message: ClientChatMessage, at: DateTime<Utc>) -> Self {
        Self {
            r#type: MessageType::Chat,
            username: message.username,
            message: message.message,
            timestamp: format_timestamp(at),
        }
    }

    pub fn validate(&self) -> Result<(), CodecError> {
        expect_type(self.r#type, MessageType::Chat)?;
        validate_username(&self.username)?;
        validate_message(&self.message)?;
        self.parsed_timestamp().map(|_| ())
    }

    /// The timestamp as a UTC instant
    pub fn parsed_timestamp(&self) -> Result<DateTime<Utc>, CodecError> {
        parse_timestamp(&self.timestamp)
            .ok_or_else(|| CodecError::InvalidTimestamp(self.timestamp.clone()))
    }
}

/// Decode a client frame, dispatching on its `type`.
///
/// Length rules are NOT checked here: the relay applies its username policy
/// first and validates afterwards.
pub fn decode_client_frame(text: &str) -> Result<ClientFrame, CodecError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(CodecError::InvalidJson)?;

    let type_name = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();

    match type_name.as_str() {
        "chat" => serde_json::from_value(value)
            .map(ClientFrame::Chat)
            .map_err(CodecError::InvalidJson),
        "join" => serde_json::from_value(value)
            .map(ClientFrame::Join)
            .map_err(CodecError::InvalidJson),
        _ => Err(CodecError::UnsupportedType(type_name)),
    }
}

/// Decode and fully validate a server frame
pub fn decode_server_message(text: &str) -> Result<ServerChatMessage, CodecError> {
    let message: ServerChatMessage = serde_json::from_str(text).map_err(CodecError::InvalidJson)?;
    message.validate()?;
    Ok(message)
}

/// Direct JSON encode, no transformation
pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(CodecError::Serialize)
}

fn expect_type(actual: MessageType, expected: MessageType) -> Result<(), CodecError> {
    if actual == expected {
        Ok(())
    } else {
        Err(CodecError::UnsupportedType(actual.as_str().to_string()))
    }
}

/// Length as a browser counts it: UTF-16 code units, so `😀` is 2
fn utf16_len_within(value: &str, max: usize) -> Result<(), usize> {
    let len = value.encode_utf16().count();
    if (1..=max).contains(&len) {
        Ok(())
    } else {
        Err(len)
    }
}

pub fn validate_username(username: &str) -> Result<(), CodecError> {
    utf16_len_within(username, USERNAME_MAX_LEN).map_err(CodecError::UsernameLength)
}

pub fn validate_message(message: &str) -> Result<(), CodecError> {
    utf16_len_within(message, MESSAGE_MAX_LEN).map_err(CodecError::MessageLength)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_decode_client_chat_frame() {
        // テスト項目: chat フレームが ClientChatMessage として解釈される
        // given (前提条件):
        let text = r#"{"type":"chat","username":"alice","message":"hi"}"#;

        // when (操作):
        let frame = decode_client_frame(text).unwrap();

        // then (期待する結果):
        assert_eq!(frame, ClientFrame::Chat(ClientChatMessage::new("alice", "hi")));
    }

    #[test]
    fn test_decode_client_join_frame() {
        // テスト項目: join フレームは語彙として解釈できる
        // given (前提条件):
        let text = r#"{"type":"join","username":"alice"}"#;

        // when (操作):
        let frame = decode_client_frame(text).unwrap();

        // then (期待する結果):
        match frame {
            ClientFrame::Join(join) => {
                assert_eq!(join.username, "alice");
                assert!(join.validate().is_ok());
            }
            other => panic!("expected join frame, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_client_frame_invalid_json() {
        // テスト項目: JSON でないフレームは InvalidJson で拒否される
        // given (前提条件):
        let text = "hello";

        // when (操作):
        let result = decode_client_frame(text);

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::InvalidJson(_))));
    }

    #[test]
    fn test_decode_client_frame_unknown_type() {
        // テスト項目: 未知の type や type 欠落は UnsupportedType で拒否される
        // given (前提条件):
        let unknown = r#"{"type":"typing","username":"alice"}"#;
        let missing = r#"{"username":"alice","message":"hi"}"#;

        // when (操作):
        let unknown_result = decode_client_frame(unknown);
        let missing_result = decode_client_frame(missing);

        // then (期待する結果):
        assert!(matches!(unknown_result, Err(CodecError::UnsupportedType(t)) if t == "typing"));
        assert!(matches!(missing_result, Err(CodecError::UnsupportedType(t)) if t.is_empty()));
    }

    #[test]
    fn test_decode_client_frame_wrong_field_type() {
        // テスト項目: フィールドの型が異なる場合は InvalidJson で拒否される
        // given (前提条件):
        let text = r#"{"type":"chat","username":"alice","message":42}"#;

        // when (操作):
        let result = decode_client_frame(text);

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::InvalidJson(_))));
    }

    #[test]
    fn test_absent_username_decodes_as_empty() {
        // テスト項目: username が欠落していても空文字としてデコードされ、検証で拒否される
        // given (前提条件):
        let text = r#"{"type":"chat","message":"hi"}"#;

        // when (操作):
        let frame = decode_client_frame(text).unwrap();

        // then (期待する結果):
        let ClientFrame::Chat(chat) = frame else {
            panic!("expected chat frame");
        };
        assert_eq!(chat.username, "");
        assert!(matches!(chat.validate(), Err(CodecError::UsernameLength(0))));
    }

    #[test]
    fn test_client_chat_length_bounds() {
        // テスト項目: username は 1〜50 文字、message は 1〜500 文字のみ受け付ける
        // given (前提条件):
        let max_username = "a".repeat(USERNAME_MAX_LEN);
        let long_username = "a".repeat(USERNAME_MAX_LEN + 1);
        let max_message = "m".repeat(MESSAGE_MAX_LEN);
        let long_message = "m".repeat(MESSAGE_MAX_LEN + 1);

        // when (操作) / then (期待する結果):
        assert!(ClientChatMessage::new(&max_username, &max_message).validate().is_ok());
        assert!(matches!(
            ClientChatMessage::new(&long_username, "hi").validate(),
            Err(CodecError::UsernameLength(51))
        ));
        assert!(matches!(
            ClientChatMessage::new("alice", "").validate(),
            Err(CodecError::MessageLength(0))
        ));
        assert!(matches!(
            ClientChatMessage::new("alice", &long_message).validate(),
            Err(CodecError::MessageLength(501))
        ));
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        // テスト項目: 長さはバイト数ではなく UTF-16 の単位数で数えられる
        // given (前提条件):
        // 50 文字 = 150 バイト
        let username = "あ".repeat(USERNAME_MAX_LEN);

        // when (操作):
        let result = ClientChatMessage::new(username, "こんにちは").validate();

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[test]
    fn test_astral_characters_count_as_two_units() {
        // テスト項目: 絵文字などの BMP 外の文字は 2 単位として数えられる
        // given (前提条件):
        let max_username = "😀".repeat(USERNAME_MAX_LEN / 2);
        let long_username = "😀".repeat(USERNAME_MAX_LEN / 2 + 1);
        let long_message = "😀".repeat(MESSAGE_MAX_LEN / 2 + 1);

        // when (操作) / then (期待する結果):
        assert!(ClientChatMessage::new(&max_username, "hi").validate().is_ok());
        assert!(matches!(
            ClientChatMessage::new(&long_username, "hi").validate(),
            Err(CodecError::UsernameLength(52))
        ));
        assert!(matches!(
            validate_message(&long_message),
            Err(CodecError::MessageLength(502))
        ));
    }

    #[test]
    fn test_client_chat_with_join_type_is_rejected() {
        // テスト項目: type が chat 以外の ClientChatMessage は検証で拒否される
        // given (前提条件):
        let mut message = ClientChatMessage::new("alice", "hi");
        message.r#type = MessageType::Join;

        // when (操作):
        let result = message.validate();

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::UnsupportedType(t)) if t == "join"));
    }

    #[test]
    fn test_stamp_preserves_fields_and_sets_timestamp() {
        // テスト項目: stamp は username / message をそのままにタイムスタンプを付与する
        // given (前提条件):
        let client = ClientChatMessage::new("alice", "hi");

        // when (操作):
        let server = ServerChatMessage::stamp(client, fixed_instant());

        // then (期待する結果):
        assert_eq!(server.r#type, MessageType::Chat);
        assert_eq!(server.username, "alice");
        assert_eq!(server.message, "hi");
        assert_eq!(server.timestamp, "2024-05-01T12:00:00.000Z");
        assert!(server.validate().is_ok());
        assert_eq!(server.parsed_timestamp().unwrap(), fixed_instant());
    }

    #[test]
    fn test_encode_server_message_field_order() {
        // テスト項目: エンコード結果は追加の変換を行わない素の JSON になる
        // given (前提条件):
        let server = ServerChatMessage::stamp(ClientChatMessage::new("alice", "hi"), fixed_instant());

        // when (操作):
        let json = encode(&server).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            r#"{"type":"chat","username":"alice","message":"hi","timestamp":"2024-05-01T12:00:00.000Z"}"#
        );
    }

    #[test]
    fn test_decode_server_message_success() {
        // テスト項目: 正しいサーバーフレームがデコードされる
        // given (前提条件):
        let text = r#"{"type":"chat","username":"bob","message":"yo","timestamp":"2024-05-01T12:00:00.000Z"}"#;

        // when (操作):
        let message = decode_server_message(text).unwrap();

        // then (期待する結果):
        assert_eq!(message.username, "bob");
        assert_eq!(message.message, "yo");
    }

    #[test]
    fn test_decode_server_message_invalid_timestamp() {
        // テスト項目: 日付として解釈できない timestamp を持つフレームは全体が拒否される
        // given (前提条件):
        let text = r#"{"type":"chat","username":"bob","message":"yo","timestamp":"not a date"}"#;

        // when (操作):
        let result = decode_server_message(text);

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_decode_server_message_missing_timestamp() {
        // テスト項目: timestamp が欠落したフレームは拒否される
        // given (前提条件):
        let text = r#"{"type":"chat","username":"bob","message":"yo"}"#;

        // when (操作):
        let result = decode_server_message(text);

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::InvalidJson(_))));
    }

    #[test]
    fn test_decode_server_message_out_of_bounds() {
        // テスト項目: 長さ制約に違反するサーバーフレームは拒否される
        // given (前提条件):
        let text = r#"{"type":"chat","username":"","message":"yo","timestamp":"2024-05-01T12:00:00Z"}"#;

        // when (操作):
        let result = decode_server_message(text);

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::UsernameLength(0))));
    }
}
