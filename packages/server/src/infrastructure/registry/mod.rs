//! ConnectionRegistry 実装
//!
//! - `inmemory`: プロセス内の HashMap による実装

pub mod inmemory;

pub use inmemory::InMemoryConnectionRegistry;
