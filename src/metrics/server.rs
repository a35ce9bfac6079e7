//! HTTP exporter for the replica metrics.
//!
//! Serves the text exposition format on `/metrics` and a liveness probe
//! on `/health`. The loop itself stays synchronous; the exporter gets its
//! own thread and runtime via [`MetricsServer::spawn`].

use crate::metrics::MetricsRegistry;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;
use tower_http::cors::CorsLayer;

/// Where the exporter listens.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Socket address to bind.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::with_port(9090)
    }
}

impl MetricsServerConfig {
    /// Localhost on `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], port).into(),
        }
    }
}

/// Exporter over a shared [`MetricsRegistry`].
pub struct MetricsServer {
    config: MetricsServerConfig,
    registry: Arc<MetricsRegistry>,
}

impl MetricsServer {
    pub fn new(config: MetricsServerConfig, registry: MetricsRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(scrape))
            .route("/health", get(|| async { "OK" }))
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.registry))
    }

    /// Binds and serves until the listener fails.
    pub async fn serve(self) -> io::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Serving replica metrics");
        axum::serve(listener, self.router()).await
    }

    /// Starts [`serve`](Self::serve) on a dedicated thread.
    pub fn spawn(self) -> JoinHandle<()> {
        std::thread::spawn(move || {
            let result = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .and_then(|runtime| runtime.block_on(self.serve()));
            if let Err(e) = result {
                tracing::error!(error = %e, "Metrics exporter stopped");
            }
        })
    }
}

async fn scrape(State(registry): State<Arc<MetricsRegistry>>) -> Response {
    match registry.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        assert_eq!(MetricsServerConfig::default().bind_addr.port(), 9090);
    }

    #[test]
    fn test_binds_loopback() {
        let config = MetricsServerConfig::with_port(8080);
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.bind_addr.ip().is_loopback());
    }

    #[test]
    fn test_router_builds() {
        let server = MetricsServer::new(
            MetricsServerConfig::default(),
            MetricsRegistry::new().unwrap(),
        );
        let _router = server.router();
    }
}
