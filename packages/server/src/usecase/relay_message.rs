//! UseCase: メッセージ中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() メソッド
//! - フレームの検証、タイムスタンプ付与、Open な全接続への一斉送信
//!
//! ### なぜこのテストが必要か
//! - 不正なフレームが誰にも届かないことを保証する
//! - Open でない接続はエラーにならずスキップされることを保証する
//! - 送信者自身にもメッセージが届くことを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数接続への中継
//! - 異常系：JSON 不正、type 不正、長さ制約違反
//! - エッジケース：Closed な接続の混在、空の username（ポリシー依存）

use std::sync::Arc;

use kaiwa_shared::{
    protocol::{ClientFrame, CodecError, ServerChatMessage, decode_client_frame, encode},
    time::Clock,
};

use crate::domain::{ConnectionRegistry, ReadyState};

use super::error::RelayError;

/// What to do with a chat frame whose username is empty or absent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UsernamePolicy {
    /// Reject the frame like any other length violation
    #[default]
    Reject,
    /// Replace the username with a fixed placeholder before validation
    Substitute(String),
}

impl UsernamePolicy {
    fn apply(&self, username: &mut String) {
        if let UsernamePolicy::Substitute(placeholder) = self
            && username.is_empty()
        {
            username.clone_from(placeholder);
        }
    }
}

/// Result of relaying one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    /// The message as it was broadcast
    pub message: ServerChatMessage,
    /// Connections the frame was handed to
    pub delivered: usize,
    /// Connections skipped because they were not open or their queue was gone
    pub skipped: usize,
}

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    /// Registry（接続集合の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    /// Clock（タイムスタンプ付与）
    clock: Arc<dyn Clock>,
    username_policy: UsernamePolicy,
}

impl RelayMessageUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        clock: Arc<dyn Clock>,
        username_policy: UsernamePolicy,
    ) -> Self {
        Self {
            registry,
            clock,
            username_policy,
        }
    }

    /// 受信した 1 フレームを中継する
    ///
    /// # Returns
    ///
    /// * `Ok(RelayOutcome)` - 中継したメッセージと送信先の数
    /// * `Err(RelayError)` - フレームを破棄した理由（送信者には通知しない）
    pub async fn execute(&self, text: &str) -> Result<RelayOutcome, RelayError> {
        let mut chat = match decode_client_frame(text)? {
            ClientFrame::Chat(chat) => chat,
            ClientFrame::Join(join) => {
                return Err(CodecError::UnsupportedType(join.r#type.as_str().to_string()).into());
            }
        };

        self.username_policy.apply(&mut chat.username);
        chat.validate()?;

        let message = ServerChatMessage::stamp(chat, self.clock.now());
        // Serialize once, every recipient gets the same bytes
        let frame = encode(&message)?;

        let mut delivered = 0;
        let mut skipped = 0;
        self.registry
            .for_each(&mut |connection| {
                if connection.ready_state() != ReadyState::Open {
                    skipped += 1;
                    return;
                }
                match connection.send_text(&frame) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!("Skipping connection during broadcast: {}", e);
                        skipped += 1;
                    }
                }
            })
            .await;

        tracing::debug!(
            "Relayed message from '{}' to {} connection(s), {} skipped",
            message.username,
            delivered,
            skipped
        );

        Ok(RelayOutcome {
            message,
            delivered,
            skipped,
        })
    }
}
