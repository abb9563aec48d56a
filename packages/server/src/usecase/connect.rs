//! UseCase: 接続登録処理

use std::sync::Arc;

use crate::domain::{Connection, ConnectionRegistry};

/// 接続登録のユースケース
pub struct ConnectUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl ConnectUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 接続を Registry に登録し、登録後の接続数を返す
    pub async fn execute(&self, connection: Arc<dyn Connection>) -> usize {
        let id = connection.id();
        self.registry.add(connection).await;
        let count = self.registry.len().await;
        tracing::info!("Connection '{}' opened ({} connected)", id, count);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionId, MockConnection},
        infrastructure::registry::InMemoryConnectionRegistry,
    };

    #[tokio::test]
    async fn test_connect_registers_connection() {
        // テスト項目: 接続が Registry に登録され、接続数が返される
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let usecase = ConnectUseCase::new(registry.clone());
        let id = ConnectionId::generate();
        let mut connection = MockConnection::new();
        connection.expect_id().return_const(id);

        // when (操作):
        let count = usecase.execute(Arc::new(connection)).await;

        // then (期待する結果):
        assert_eq!(count, 1);
        assert!(registry.contains(&id).await);
    }
}
