//! UseCase 層のエラー型

use kaiwa_shared::protocol::CodecError;
use thiserror::Error;

/// Reasons an inbound frame is not relayed.
///
/// Never reported to the sending peer; the websocket handler logs them.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The frame failed decoding or validation
    #[error("frame rejected: {0}")]
    Rejected(#[from] CodecError),
}
