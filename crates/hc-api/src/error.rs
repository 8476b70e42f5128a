//! Error types for hc-api

use reqwest::StatusCode;

/// Result type for hc-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the Home Connect API or its token endpoint
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A refresh was requested but no refresh token is held
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The token endpoint exchange failed
    #[error("Failed to refresh token: {0}")]
    RefreshFailed(String),

    /// The API rejected the bearer token (HTTP 401)
    #[error("Request failed with status code 401: {body}")]
    Unauthorized { body: String },

    /// Any other non-2xx answer from the API
    #[error("Request failed with status code {}: {body}", .status.as_u16())]
    Upstream { status: StatusCode, body: String },

    /// Connection, TLS or protocol failure below HTTP
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error should trigger the token refresh path
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized { .. })
    }

    /// Map a non-success status and its body to the matching variant
    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            Error::Unauthorized { body }
        } else {
            Error::Upstream { status, body }
        }
    }
}
