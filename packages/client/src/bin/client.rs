//! Terminal client for the Kaiwa broadcast chat.
//!
//! Connects to the chat server, prints every relayed message and sends each
//! typed line. The display name is kept in a local file between runs.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kaiwa-client
//! cargo run --bin kaiwa-client -- --username Alice --auto-reconnect
//! ```

use std::path::PathBuf;

use clap::Parser;

use kaiwa_client::{ClientConfig, run_client, username::DEFAULT_USERNAME_FILE};
use kaiwa_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kaiwa-client")]
#[command(about = "Terminal client for the Kaiwa broadcast chat", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Display name (saved for the next run)
    #[arg(short = 'n', long)]
    username: Option<String>,

    /// File holding the display name
    #[arg(long, default_value = DEFAULT_USERNAME_FILE)]
    username_file: PathBuf,

    /// Reconnect automatically after the connection is lost
    #[arg(long)]
    auto_reconnect: bool,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ClientConfig {
        url: args.url,
        username: args.username,
        username_file: args.username_file,
        auto_reconnect: args.auto_reconnect,
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
