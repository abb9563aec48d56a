//! Infrastructure layer: concrete connection handles and registry storage.

pub mod connection;
pub mod registry;
