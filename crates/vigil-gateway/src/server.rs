//! Router assembly and the HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use vigil_runtime::AgentRuntime;

use crate::error::{GatewayError, GatewayResult};
use crate::routes::{self, AppState};

/// Server settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
    /// How often expired approvals are purged.
    pub sweep_interval: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            cors_origins: Vec::new(),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Build the CORS layer for `origins`.
///
/// # Errors
///
/// Returns [`GatewayError::Config`] if an origin is not a valid header value.
pub fn cors_layer(origins: &[String]) -> GatewayResult<CorsLayer> {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return Ok(base.allow_origin(Any));
    }
    let parsed = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).map_err(|e| GatewayError::Config(format!("invalid CORS origin '{o}': {e}")))
        })
        .collect::<GatewayResult<Vec<_>>>()?;
    Ok(base.allow_origin(parsed))
}

/// The API routes over `state`, without middleware.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/chat", post(routes::chat))
        .route("/api/approve", post(routes::approve))
        .route("/api/execute", post(routes::execute))
        .with_state(state)
}

/// The HTTP server.
#[derive(Debug)]
pub struct GatewayServer {
    runtime: Arc<AgentRuntime>,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Serve `runtime` with `config`.
    #[must_use]
    pub fn new(runtime: Arc<AgentRuntime>, config: GatewayConfig) -> Self {
        Self { runtime, config }
    }

    /// The full router, with CORS and request tracing.
    ///
    /// # Errors
    ///
    /// Returns an error if the CORS origins are invalid.
    pub fn router(&self) -> GatewayResult<Router> {
        let cors = cors_layer(&self.config.cors_origins)?;
        Ok(api_router(AppState::new(Arc::clone(&self.runtime)))
            .layer(cors)
            .layer(TraceLayer::new_for_http()))
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the server stops abnormally.
    pub async fn serve<F>(self, shutdown: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    ///
    /// Expired approvals are purged in the background while serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the server stops abnormally.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router()?;
        let sweeper = self
            .runtime
            .approvals()
            .spawn_sweeper(self.config.sweep_interval);

        info!(addr = %listener.local_addr()?, "Gateway listening");
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        sweeper.abort();
        info!("Gateway stopped");
        result.map_err(GatewayError::from)
    }
}
