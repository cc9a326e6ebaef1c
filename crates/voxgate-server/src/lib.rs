use std::net::SocketAddr;

use axum::{Router, routing::get};
use http::StatusCode;
use tower_http::{services::ServeDir, trace::TraceLayer};
use voxgate_config::Config;

/// Assembled HTTP server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the speech service cannot be initialized
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let tts_state = tts::build_server(config)?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, get(|| async { (StatusCode::OK, "ok") }));
        }

        app = app.merge(tts::endpoint_router().with_state(tts_state));

        // Static assets answer anything the API does not
        if let Some(ref dir) = config.server.static_dir {
            tracing::debug!(static_dir = %dir.display(), "serving static files");
            app = app.fallback_service(ServeDir::new(dir));
        }

        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Address `serve` binds to
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// The assembled router, for callers that bind their own listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Bind the listen address and serve until `shutdown` is cancelled
    ///
    /// In-flight requests are drained before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {}: {e}", self.listen_address))?;

        tracing::info!(local_addr = %listener.local_addr()?, "voxgate listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("draining in-flight requests");
            })
            .await?;

        Ok(())
    }
}
