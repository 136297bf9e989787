//! Network module with deferred startup lifecycle.
//!
//! `new()` wires the shared state, `start()` binds the TCP listener, and
//! `serve()` accepts connections until the shutdown future resolves.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    complete_todo, create_todo, delete_todo, get_todo, health_handler, list_todos,
    liveness_handler, readiness_handler, reopen_todo, update_todo, AppState,
};
use super::middleware::build_http_layers;
use super::shutdown::ShutdownController;
use crate::service::{ContextFactory, Dispatcher, ErrorTranslator, ServerConfig};

/// Manages the HTTP server lifecycle.
///
/// 1. `new()` -- allocates shared state (dispatcher, shutdown controller)
/// 2. `start()` -- binds the TCP listener to the configured address
/// 3. `serve()` -- accepts connections until shutdown is signalled
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    state: AppState,
}

impl NetworkModule {
    /// Creates a network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, server_config: &ServerConfig, dispatcher: Dispatcher) -> Self {
        let state = AppState {
            dispatcher,
            translator: ErrorTranslator::new(server_config.environment),
            contexts: Arc::new(ContextFactory::new(server_config)),
            shutdown: Arc::new(ShutdownController::new()),
            config: Arc::new(config.clone()),
            start_time: Instant::now(),
        };
        Self {
            config,
            listener: None,
            state,
        }
    }

    /// Shared shutdown controller, for health checks or triggering shutdown.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.state.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `POST /api/todos`, `GET /api/todos`
    /// - `GET|PUT|DELETE /api/todos/{id}`
    /// - `POST /api/todos/{id}/complete`, `POST /api/todos/{id}/reopen`
    /// - `GET /health`, `GET /health/live`, `GET /health/ready`
    pub fn build_router(&self) -> Router {
        build_app(self.state.clone(), &self.config)
    }

    /// Binds the TCP listener and returns the bound port (useful with port 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "TCP listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then drains.
    ///
    /// On the shutdown signal the health state moves to `Draining` so
    /// readiness probes fail. Once axum has stopped accepting, calls still in
    /// flight get `drain_timeout` to finish before they are cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first, or if the server
    /// hits a fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;
        let router = self.build_router();
        let controller = self.shutdown_controller();

        controller.set_ready();
        info!("serving HTTP");

        let signal_controller = Arc::clone(&controller);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("shutdown signal received, draining");
                signal_controller.trigger_shutdown();
            })
            .await?;

        if controller.wait_for_drain(self.config.drain_timeout).await {
            info!("all in-flight calls drained");
        } else {
            warn!(
                in_flight = controller.in_flight_count(),
                "drain timeout expired, cancelling remaining calls"
            );
            controller.cancel_in_flight();
        }
        Ok(())
    }
}

/// The full application router for `state`, with the HTTP middleware stack.
pub fn build_app(state: AppState, config: &NetworkConfig) -> Router {
    Router::new()
        .route("/api/todos", post(create_todo).get(list_todos))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/todos/{id}/complete", post(complete_todo))
        .route("/api/todos/{id}/reopen", post(reopen_todo))
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(build_http_layers(config))
        .with_state(state)
}
