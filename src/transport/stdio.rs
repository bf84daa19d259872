//! Stdio transport for the MCP server.
//!
//! This transport uses standard input/output for communication, which is the
//! standard mode for CLI-based MCP integrations.

use crate::config::Config;
use crate::error::{MetrikaError, MetrikaResult};
use crate::mcp::MetrikaService;
use crate::metrika::MetrikaClient;
use crate::transport::Transport;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

/// Stdio transport implementation.
///
/// Reads JSON-RPC messages from stdin and writes responses to stdout,
/// following the MCP protocol specification.
pub struct StdioTransport {
    client: Arc<MetrikaClient>,
    config: Arc<Config>,
}

impl StdioTransport {
    /// Create a new stdio transport sharing the Metrika client.
    pub fn new(client: Arc<MetrikaClient>, config: Arc<Config>) -> Self {
        Self { client, config }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> MetrikaResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = MetrikaService::new(self.client.clone(), &self.config);
        info!(tools = service.exposed_tools().len(), "Tool catalog ready");

        let transport = stdio();
        let running_service = service.serve(transport).await.map_err(|e| {
            MetrikaError::config(format!("Failed to start stdio transport: {e}"))
        })?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => {
                        info!("Stdio transport completed normally");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Stdio transport error");
                        return Err(MetrikaError::config(format!("Stdio transport error: {e}")));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            // Spawn a task to listen for second signal and force exit
            tokio::spawn(async {
                wait_for_signal().await;
                tracing::warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        // Release the upstream client on shutdown
        info!("Releasing Yandex Metrika client");
        self.client.close().await;

        if shutdown_requested {
            // Force exit since stdio may still be blocking on stdin
            // tokio::select! cannot interrupt blocking stdin reads
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdio_transport_creation() {
        let config = Arc::new(Config {
            api_key: "test-token".to_string(),
            ..Config::default()
        });
        let client = Arc::new(MetrikaClient::new(&config).unwrap());
        let transport = StdioTransport::new(client, config);
        assert_eq!(transport.name(), "stdio");
    }
}
