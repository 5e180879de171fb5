use thiserror::Error;

use crate::error::ErrorCategory;

/// Message used when the backend gives no usable explanation.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors that can occur during a single API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received (DNS, refused connection, timeout, reset).
    #[error("Connection error: {0}")]
    Connectivity(String),

    /// The backend answered with an HTML page instead of JSON.
    #[error("Upstream returned a non-JSON error page (HTTP {status})")]
    MalformedUpstream {
        /// HTTP status code.
        status: u16,
    },

    /// The backend refused the credentials (401/403).
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Message from the response body.
        message: String,
    },

    /// Non-2xx response with a JSON (or empty) body.
    #[error("API error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the generic fallback.
        message: String,
    },

    /// 2xx response whose body reports `"success": false`.
    #[error("Request rejected: {message}")]
    Rejected {
        /// Message from the response body, or the generic fallback.
        message: String,
    },

    /// The body was JSON but did not match the expected shape.
    #[error("Invalid response format: {0}")]
    Decode(String),

    /// An authenticated call was attempted without a token.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The request could not be built (bad URL, unreadable upload).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// User-facing category of this failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Connectivity(_) => ErrorCategory::Connectivity,
            Self::MalformedUpstream { .. } => ErrorCategory::MalformedUpstream,
            Self::Unauthorized { .. } | Self::MissingCredentials(_) => {
                ErrorCategory::Authentication
            }
            Self::Server { .. } | Self::Rejected { .. } | Self::Decode(_) => ErrorCategory::Server,
            Self::InvalidRequest(_) => ErrorCategory::Validation,
        }
    }

    /// Human-readable message suitable for an alert.
    pub fn message(&self) -> String {
        match self {
            Self::Server { message, .. }
            | Self::Rejected { message }
            | Self::Unauthorized { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::MalformedUpstream { status }
            | Self::Unauthorized { status, .. }
            | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
