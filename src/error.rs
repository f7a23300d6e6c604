use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ConsoleError
///
/// The single error type shared by the stores, the navigation controller,
/// the API client and the HTTP shell.
///
/// Only `InvalidArgument` and `StorageUnavailable` can come out of the session
/// store. `NavigationAborted` is bookkeeping for superseded navigations and is
/// never shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// A caller passed a value the operation refuses (e.g. an empty token).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Persisted storage could not be read or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The navigation was superseded or never allowed, so its after-hook is discarded.
    #[error("Navigation aborted: {0}")]
    NavigationAborted(String),

    /// Redirects kept bouncing between locations.
    #[error("Too many redirects while navigating to '{0}'")]
    TooManyRedirects(String),

    /// The backend rejected the session token, or no session exists.
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend answered with a non-success envelope.
    #[error("Upstream error ({code}): {message}")]
    Upstream { code: i64, message: String },

    /// Transport failure talking to the backend.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ConsoleError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self::NavigationAborted(message.into())
    }

    /// Maps each kind to the status the shell answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NavigationAborted(_) => StatusCode::CONFLICT,
            Self::TooManyRedirects(_) => StatusCode::LOOP_DETECTED,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Upstream { .. } | Self::Http(_) | Self::Serialization(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Serialization(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
