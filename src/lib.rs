//! Metrika MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI assistants
//! to query Yandex Metrika web analytics (traffic, content, demographics,
//! geography, performance, and e-commerce reports).

pub mod config;
pub mod error;
pub mod mcp;
pub mod metrika;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::MetrikaError;
pub use mcp::MetrikaService;
pub use metrika::MetrikaClient;
