//! Metrika MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to query Yandex Metrika web analytics.

use clap::Parser;
use metrika_mcp_server::config::{mask_sensitive, Config, TransportMode};
use metrika_mcp_server::metrika::MetrikaClient;
use metrika_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging
    if config.enable_logs {
        init_tracing(&config);
    }

    if let Err(msg) = config.validate() {
        eprintln!("Error: {msg}");
        eprintln!();
        eprintln!("Usage: metrika-mcp-server [--transport stdio|http]");
        eprintln!();
        eprintln!("Required environment:");
        eprintln!("  YANDEX_API_KEY     OAuth token with Yandex Metrika access");
        eprintln!();
        eprintln!("Optional environment:");
        eprintln!("  YANDEX_TIMEOUT     per-attempt timeout in seconds (default 30)");
        eprintln!("  YANDEX_RETRIES     total attempts for transient failures (default 3)");
        eprintln!("  YANDEX_RETRY_DELAY linear backoff base in seconds (default 1.0)");
        eprintln!("  READ_ONLY_MODE     hide write-tagged tools (default off)");
        eprintln!("  ENABLED_TOOLS      comma-separated tool allow-list (default all)");
        std::process::exit(1);
    }

    info!(
        transport = %config.transport,
        api_key = %mask_sensitive(&config.api_key, 4),
        read_only = config.read_only,
        "Starting Metrika MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Build the shared upstream client once; it lives for the whole process
    let client = Arc::new(MetrikaClient::new(&config)?);
    let config = Arc::new(config);

    let result = match config.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            let transport = StdioTransport::new(client, config.clone());
            transport.run().await
        }
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            let transport = HttpTransport::new(client, config.clone());
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
