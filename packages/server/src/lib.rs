//! Kaiwa broadcast chat server.
//!
//! Every valid chat frame received on `/ws` is stamped with the server time
//! and relayed to every open connection, sender included.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
