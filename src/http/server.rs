//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: relay middleware in front of the fallback
//!   (static files or 404)
//! - Wire up middleware (tracing, request ID, panic catching)
//! - Serve on a bound listener until shutdown

use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};

use crate::config::RelayConfig;
use crate::http::request::request_id_middleware;
use crate::http::response::{not_found, panic_response};
use crate::relay::{relay_middleware, Relay};

/// HTTP server hosting the relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a new server from a validated configuration.
    ///
    /// Fails only when the upstream HTTP client cannot be built.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let relay = Arc::new(Relay::new(&config.relay)?);
        let router = Self::build_router(&config, relay);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, relay: Arc<Relay>) -> Router {
        let fallback = match &config.static_files.dir {
            Some(dir) => Router::new().fallback_service(ServeDir::new(dir)),
            None => Router::new().fallback(not_found),
        };

        Self::with_layers(fallback, relay)
    }

    /// Put the relay and the shared middleware in front of `inner`.
    fn with_layers(inner: Router, relay: Arc<Relay>) -> Router {
        inner
            .layer(middleware::from_fn_with_state(relay, relay_middleware))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for embedding or for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            relay_path = %self.config.relay.path,
            static_dir = ?self.config.static_files.dir,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
