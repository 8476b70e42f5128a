//! Error types for the MCP server

use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during MCP server operations
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown tool requested
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments do not satisfy the tool's input schema
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A required configuration value is missing
    #[error("{0} not configured")]
    Configuration(String),

    /// The access token was refreshed; the original call was not replayed
    #[error("Token refreshed, please retry the request")]
    TokenRefreshed,

    /// A 401 could not be recovered by refreshing the token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(#[source] hc_api::Error),

    /// Any other downstream failure
    #[error("Tool execution failed: {0}")]
    Execution(#[source] hc_api::Error),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }
}
