//! Error types for the Metrika MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. Each variant carries enough detail for an AI assistant to
//! understand whether the failure was its own input, the credential, or the
//! upstream API.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetrikaError {
    /// Caller input violated a stated constraint. Never sent upstream.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Upstream returned 401/403. Not retried; the credential is the problem.
    #[error("Yandex Metrika authentication failed ({status}). Check your YANDEX_API_KEY.")]
    Auth { status: u16 },

    /// Network-level failure (connect/timeout) that exhausted all retries.
    #[error("Request failed after {attempts} attempts: {message}")]
    Transport { attempts: u32, message: String },

    /// Non-2xx, non-auth upstream status. `attempts` is 1 for statuses that
    /// are not retried.
    #[error("Yandex Metrika error {status} after {attempts} attempt(s): {body}")]
    Upstream {
        status: u16,
        attempts: u32,
        body: String,
    },

    /// Catch-all wrap applied once at the tool boundary for failures that are
    /// not already classified (e.g. a malformed response body).
    #[error("Yandex Metrika API error in {operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<MetrikaError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl MetrikaError {
    /// Create a validation error naming the offending field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error from an upstream status code.
    pub fn auth(status: u16) -> Self {
        Self::Auth { status }
    }

    /// Create a transport error after exhausting retries.
    pub fn transport(attempts: u32, message: impl Into<String>) -> Self {
        Self::Transport {
            attempts,
            message: message.into(),
        }
    }

    /// Create an upstream error from a status code and response body.
    pub fn upstream(status: u16, attempts: u32, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            attempts,
            body: body.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Tag this error with the operation it occurred in.
    ///
    /// Errors already classified by the client or validators pass through
    /// unchanged; anything else is wrapped so callers never see an untyped
    /// failure shape.
    pub fn into_operation(self, operation: &str) -> Self {
        match self {
            Self::Validation { .. }
            | Self::Auth { .. }
            | Self::Transport { .. }
            | Self::Upstream { .. }
            | Self::Operation { .. } => self,
            other => Self::Operation {
                operation: operation.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Check whether this error came from caller input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result type alias for Metrika operations.
pub type MetrikaResult<T> = Result<T, MetrikaError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert MetrikaError to MCP ErrorData for semantic error categorization.
impl From<MetrikaError> for rmcp::ErrorData {
    fn from(err: MetrikaError) -> Self {
        match &err {
            MetrikaError::Validation { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), None)
            }
            MetrikaError::Auth { .. } => rmcp::ErrorData::internal_error(
                err.to_string(),
                suggestion_data(Some(
                    "Check that YANDEX_API_KEY is a valid OAuth token with Metrika access",
                )),
            ),
            MetrikaError::Transport { .. } => rmcp::ErrorData::internal_error(
                err.to_string(),
                suggestion_data(Some("Check network connectivity and retry")),
            ),
            _ => rmcp::ErrorData::internal_error(err.to_string(), None),
        }
    }
}
