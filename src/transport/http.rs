//! HTTP transport with Streamable HTTP support for the MCP server.
//!
//! This transport uses HTTP with streaming responses, which is suitable for
//! web-based MCP integrations.

use crate::config::Config;
use crate::error::{MetrikaError, MetrikaResult};
use crate::mcp::MetrikaService;
use crate::metrika::MetrikaClient;
use crate::transport::Transport;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// HTTP transport implementation with Streamable HTTP support.
pub struct HttpTransport {
    client: Arc<MetrikaClient>,
    config: Arc<Config>,
}

impl HttpTransport {
    /// Create a new HTTP transport sharing the Metrika client.
    pub fn new(client: Arc<MetrikaClient>, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        self.config.http_bind_addr()
    }

    /// Get the MCP endpoint path.
    pub fn endpoint(&self) -> &str {
        &self.config.mcp_endpoint
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> MetrikaResult<()> {
        let bind_addr = self.bind_addr();
        info!("Starting MCP server with HTTP transport on {}", bind_addr);

        // Clone Arc references for the service factory closure
        let client = self.client.clone();
        let config = self.config.clone();

        let service = StreamableHttpService::new(
            move || Ok(MetrikaService::new(client.clone(), &config)),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // Build the axum router with configurable endpoint
        // Note: nest_service doesn't support root path "/", use fallback_service instead
        let endpoint = self.endpoint().to_string();
        let app = if endpoint == "/" {
            axum::Router::new().fallback_service(service)
        } else {
            axum::Router::new().nest_service(&endpoint, service)
        };

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            MetrikaError::config(format!(
                "Failed to bind to {bind_addr}: {e}. Check that the port is available"
            ))
        })?;

        info!(endpoint = %endpoint, "MCP endpoint ready");

        // Graceful shutdown: streaming connections may keep the server alive
        // indefinitely, so force exit after a timeout once a signal arrives
        const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();

        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        tokio::select! {
            result = server => {
                match result {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        return Err(MetrikaError::config(format!("HTTP server error: {e}")));
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)..."
                );

                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => {
                // Timeout or second signal reached - server will be dropped
            }
        }

        info!("Releasing Yandex Metrika client");
        self.client.close().await;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
