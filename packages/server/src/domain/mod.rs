//! Domain layer: connection handles and the registry abstraction.

mod connection;
mod registry;

pub use connection::{Connection, ConnectionId, PushError, ReadyState};
pub use registry::ConnectionRegistry;

#[cfg(test)]
pub use connection::MockConnection;
