mod cors;
mod health;

use std::net::SocketAddr;

use apibridge_config::Config;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the TTS subsystem fails to initialize
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let tts_state = tts::build_server(config)?;
        Ok(Self::with_tts(config, tts_state))
    }

    /// Build the server around an already constructed TTS subsystem
    pub fn with_tts(config: &Config, tts_state: std::sync::Arc<tts::Server>) -> Self {
        let listen_address = config.server.listen_address();

        let health_path = config
            .server
            .health
            .enabled
            .then(|| config.server.health.path.clone());

        let info = health::service_info(health_path.as_deref());

        let mut app = Router::new().route(
            "/",
            axum::routing::get(move || {
                let info = info.clone();
                async move { Json(info) }
            }),
        );

        // Health check
        if let Some(ref path) = health_path {
            app = app.route(path, axum::routing::get(health::health_handler));
        }

        // TTS routes
        app = app.merge(tts::endpoint_router().with_state(tts_state));

        // Apply middleware layers (innermost first)

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS
        if config.server.cors.enabled {
            app = app.layer(cors::cors_layer(&config.server.cors));
        }

        Self {
            router: app,
            listen_address,
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Replace the listen address (e.g. from a CLI override)
    #[must_use]
    pub fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
