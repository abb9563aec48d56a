//! UseCase: 切断処理

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry};

/// 切断のユースケース
pub struct DisconnectUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 接続を Registry から削除する
    ///
    /// close と error の両方から呼ばれうるため、未登録の接続に対しては何もしない。
    /// 実際に削除した場合に `true` を返す。
    pub async fn execute(&self, id: &ConnectionId) -> bool {
        let removed = self.registry.remove(id).await;
        if removed {
            let remaining = self.registry.len().await;
            tracing::info!("Connection '{}' closed ({} connected)", id, remaining);
        } else {
            tracing::debug!("Connection '{}' already removed", id);
        }
        removed
    }
}
