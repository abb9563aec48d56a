//! Kaiwa broadcast chat server.
//!
//! Relays every valid chat message to all connected clients, sender included,
//! and serves the static web client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kaiwa-server
//! cargo run --bin kaiwa-server -- --host 0.0.0.0 --port 3000 --assets ./assets
//! cargo run --bin kaiwa-server -- --anonymous-username 匿名
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use kaiwa_server::{
    infrastructure::registry::InMemoryConnectionRegistry,
    ui::Server,
    usecase::{ConnectUseCase, DisconnectUseCase, RelayMessageUseCase, UsernamePolicy},
};
use kaiwa_shared::{logger::setup_logger, protocol::validate_username, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "kaiwa-server")]
#[command(about = "WebSocket broadcast chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Directory served for every path other than /ws
    #[arg(short = 'a', long, default_value = "assets")]
    assets: PathBuf,

    /// Substitute this name for empty usernames instead of dropping the message
    #[arg(long)]
    anonymous_username: Option<String>,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let username_policy = match args.anonymous_username {
        Some(placeholder) => {
            // Substituted names go through the same length check as sent ones
            if let Err(e) = validate_username(&placeholder) {
                tracing::error!("Invalid --anonymous-username '{}': {}", placeholder, e);
                std::process::exit(2);
            }
            UsernamePolicy::Substitute(placeholder)
        }
        None => UsernamePolicy::Reject,
    };
    tracing::debug!("Username policy: {:?}", username_policy);

    // 1. Registry (owned for the server's lifetime)
    let registry = Arc::new(InMemoryConnectionRegistry::new());

    // 2. UseCases
    let connect_usecase = Arc::new(ConnectUseCase::new(registry.clone()));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(registry.clone()));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        registry,
        Arc::new(SystemClock),
        username_policy,
    ));

    // 3. Server
    let server = Server::new(
        connect_usecase,
        disconnect_usecase,
        relay_message_usecase,
        args.assets,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
