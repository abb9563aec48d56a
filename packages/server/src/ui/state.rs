//! Server state shared by the handlers.

use std::sync::Arc;

use crate::usecase::{ConnectUseCase, DisconnectUseCase, RelayMessageUseCase};

/// Shared application state
pub struct AppState {
    /// ConnectUseCase（接続登録のユースケース）
    pub connect_usecase: Arc<ConnectUseCase>,
    /// DisconnectUseCase（切断のユースケース）
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    /// RelayMessageUseCase（メッセージ中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
}
