//! Server execution logic.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::usecase::{ConnectUseCase, DisconnectUseCase, RelayMessageUseCase};

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat server
///
/// `/ws` is upgraded to a websocket, `/health` answers a liveness probe and
/// every other path is served from the static asset root.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_usecase,
///     disconnect_usecase,
///     relay_message_usecase,
///     PathBuf::from("assets"),
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ConnectUseCase（接続登録のユースケース）
    connect_usecase: Arc<ConnectUseCase>,
    /// DisconnectUseCase（切断のユースケース）
    disconnect_usecase: Arc<DisconnectUseCase>,
    /// RelayMessageUseCase（メッセージ中継のユースケース）
    relay_message_usecase: Arc<RelayMessageUseCase>,
    /// Static asset root
    assets_dir: PathBuf,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        connect_usecase: Arc<ConnectUseCase>,
        disconnect_usecase: Arc<DisconnectUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        assets_dir: PathBuf,
    ) -> Self {
        Self {
            connect_usecase,
            disconnect_usecase,
            relay_message_usecase,
            assets_dir,
        }
    }

    /// Build the axum router without binding a listener
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_usecase: self.connect_usecase,
            disconnect_usecase: self.disconnect_usecase,
            relay_message_usecase: self.relay_message_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            .route("/health", get(health_check))
            // 静的ファイル
            .fallback_service(ServeDir::new(self.assets_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the WebSocket chat server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let assets_dir = self.assets_dir.clone();
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "WebSocket chat server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Serving static files from {}", assets_dir.display());
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
