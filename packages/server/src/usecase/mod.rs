//! UseCase layer: connection lifecycle and message relay.

mod connect;
mod disconnect;
mod error;
mod relay_message;

pub use connect::ConnectUseCase;
pub use disconnect::DisconnectUseCase;
pub use error::RelayError;
pub use relay_message::{RelayMessageUseCase, RelayOutcome, UsernamePolicy};
