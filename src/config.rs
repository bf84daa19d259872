//! Configuration handling for the Metrika MCP Server.
//!
//! This module provides configuration management via CLI arguments and
//! environment variables.

use clap::{Parser, ValueEnum};
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: f64 = 1.0;

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP with streamable responses (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the Metrika MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "metrika-mcp-server",
    about = "MCP server for Yandex Metrika - enables AI assistants to query web analytics",
    version,
    author
)]
pub struct Config {
    /// Yandex OAuth token with Metrika access (sensitive - never logged raw).
    /// Get one at https://oauth.yandex.ru/client/new
    #[arg(long, value_name = "TOKEN", env = "YANDEX_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Per-attempt request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, env = "YANDEX_TIMEOUT")]
    pub timeout: u64,

    /// Total request attempts for transient failures (must be >= 1)
    #[arg(long, default_value_t = DEFAULT_RETRIES, env = "YANDEX_RETRIES")]
    pub retries: u32,

    /// Linear backoff base in seconds (attempt N waits N * retry_delay)
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_SECS, env = "YANDEX_RETRY_DELAY")]
    pub retry_delay: f64,

    /// Hide tools tagged as write operations
    #[arg(long, env = "READ_ONLY_MODE")]
    pub read_only: bool,

    /// Allow-list of tool names to expose. Empty means all tools.
    #[arg(
        long = "enabled-tools",
        value_name = "NAME",
        env = "ENABLED_TOOLS",
        value_delimiter = ','
    )]
    pub enabled_tools: Vec<String>,

    /// Transport mode (stdio or http)
    #[arg(short, long, value_enum, default_value = "stdio", env = "MCP_TRANSPORT")]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "MCP_HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "MCP_HTTP_PORT")]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(long, default_value = DEFAULT_MCP_ENDPOINT, env = "MCP_ENDPOINT")]
    pub mcp_endpoint: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output (disabled by default to avoid interfering with stdio transport)
    #[arg(long, env = "MCP_ENABLE_LOGS")]
    pub enable_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY_SECS,
            read_only: false,
            enabled_tools: Vec::new(),
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
        }
    }

    /// Validate the configuration, returning an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err(
                "YANDEX_API_KEY is required. Get a token at https://oauth.yandex.ru/client/new"
                    .to_string(),
            );
        }
        if self.retries == 0 {
            return Err("retries must be at least 1".to_string());
        }
        if !self.retry_delay.is_finite() || self.retry_delay < 0.0 {
            return Err("retry_delay must be a non-negative number of seconds".to_string());
        }
        Ok(())
    }

    /// Get the allow-list of tool names, or None when all tools are enabled.
    pub fn enabled_tools(&self) -> Option<&[String]> {
        if self.enabled_tools.is_empty() {
            None
        } else {
            Some(&self.enabled_tools)
        }
    }

    /// Get the per-attempt timeout as a Duration.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Get the linear backoff base as a Duration.
    pub fn retry_delay_duration(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay)
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Mask a sensitive token for logging, keeping only the last `keep` characters.
pub fn mask_sensitive(token: &str, keep: usize) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= keep {
        "****".to_string()
    } else {
        let tail: String = chars[chars.len() - keep..].iter().collect();
        format!("****{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.retries, DEFAULT_RETRIES);
        assert_eq!(config.retry_delay, DEFAULT_RETRY_DELAY_SECS);
        assert!(!config.read_only);
        assert!(config.enabled_tools().is_none());
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.contains("YANDEX_API_KEY"));

        let config = Config {
            api_key: "   ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let config = Config {
            api_key: "token".to_string(),
            retries: 0,
            ..Config::default()
        };
        assert!(config.validate().unwrap_err().contains("retries"));
    }

    #[test]
    fn test_validate_accepts_minimal_config() {
        let config = Config {
            api_key: "token".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_enabled_tools_empty_means_all() {
        let config = Config::default();
        assert!(config.enabled_tools().is_none());

        let config = Config {
            enabled_tools: vec!["get_visits".to_string()],
            ..Config::default()
        };
        assert_eq!(config.enabled_tools().unwrap(), ["get_visits".to_string()]);
    }

    #[test]
    fn test_durations() {
        let config = Config {
            timeout: 15,
            retry_delay: 0.5,
            ..Config::default()
        };
        assert_eq!(config.timeout_duration(), Duration::from_secs(15));
        assert_eq!(config.retry_delay_duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_http_bind_addr() {
        let config = Config {
            http_host: "0.0.0.0".to_string(),
            http_port: 3000,
            ..Config::default()
        };
        assert_eq!(config.http_bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_mask_sensitive_short_token() {
        assert_eq!(mask_sensitive("abc", 4), "****");
        assert_eq!(mask_sensitive("abcd", 4), "****");
        assert_eq!(mask_sensitive("", 4), "****");
    }

    #[test]
    fn test_mask_sensitive_long_token() {
        let masked = mask_sensitive("y0_AgAAAABsecret1234", 4);
        assert_eq!(masked, "****1234");
        assert!(masked.starts_with("****"));
    }
}
