//! Canonical response formatting for MCP tools.

use serde_json::Value;

/// Serialize an upstream payload as pretty-printed JSON text.
///
/// Output is deterministic for identical input (object keys follow the map's
/// ordering) and non-ASCII characters are kept literal rather than escaped,
/// so Russian city and region names stay readable.
pub fn format_response(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}
