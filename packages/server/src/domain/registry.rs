//! ConnectionRegistry trait 定義
//!
//! サーバーが保持する接続の集合へのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{Connection, ConnectionId};

/// Connection Registry trait
///
/// - `add` / `remove` are the only mutators and are both safe to call redundantly
/// - iteration order is unspecified
/// - a registry never holds two entries for the same `ConnectionId`
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Register a connection. Re-adding an id replaces the previous handle.
    async fn add(&self, connection: Arc<dyn Connection>);

    /// Remove a connection. Returns `false` (and changes nothing) if it was absent.
    async fn remove(&self, id: &ConnectionId) -> bool;

    /// Visit every registered connection while the registry is locked
    async fn for_each(&self, visit: &mut (dyn for<'a> FnMut(&'a Arc<dyn Connection>) + Send));

    async fn contains(&self, id: &ConnectionId) -> bool;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
