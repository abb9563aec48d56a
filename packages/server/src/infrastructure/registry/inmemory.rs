//! InMemory ConnectionRegistry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! HashMap をインメモリの接続表として使用します。
//!
//! 全ての操作は Mutex を保持したまま完結するため、add / remove / for_each が
//! 中途半端な状態で観測されることはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Connection, ConnectionId, ConnectionRegistry};

/// インメモリ ConnectionRegistry 実装
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// Key: ConnectionId / Value: connection handle
    connections: Mutex<HashMap<ConnectionId, Arc<dyn Connection>>>,
}

impl InMemoryConnectionRegistry {
    /// 新しい空の InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn add(&self, connection: Arc<dyn Connection>) {
        let id = connection.id();
        let mut connections = self.connections.lock().await;
        if connections.insert(id, connection).is_some() {
            tracing::debug!("Connection '{}' re-registered, handle replaced", id);
        } else {
            tracing::debug!("Connection '{}' registered", id);
        }
    }

    async fn remove(&self, id: &ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(id).is_some();
        if removed {
            tracing::debug!("Connection '{}' unregistered", id);
        }
        removed
    }

    async fn for_each(&self, visit: &mut (dyn for<'a> FnMut(&'a Arc<dyn Connection>) + Send)) {
        let connections = self.connections.lock().await;
        for connection in connections.values() {
            visit(connection);
        }
    }

    async fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.lock().await.contains_key(id)
    }

    async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }
}
