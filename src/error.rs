//! Error types for Dermascan
//!
//! This module defines the crate-wide error enum, the result alias used by
//! every component, and the user-facing error taxonomy that the screen
//! boundary (the CLI handlers) uses to render alerts.

use thiserror::Error;

use crate::api::ApiError;

/// Main error type for Dermascan operations
///
/// Covers local failures (validation, storage, configuration) and wraps
/// [`ApiError`] for anything that went over the wire.
#[derive(Error, Debug)]
pub enum DermascanError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any network call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// No usable session; the caller must log in again
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A diagnosis was about to be cached without an owning patient
    #[error("Missing patient identity")]
    MissingPatientIdentity,

    /// Remote API failures
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Local key-value store failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// A value could not be encoded for the store
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for Dermascan operations
///
/// Uses `anyhow::Error` so callers can attach context; typed errors are
/// recovered with `downcast_ref::<DermascanError>()` or
/// `downcast_ref::<ApiError>()`.
pub type Result<T> = anyhow::Result<T>;

/// User-facing failure categories
///
/// Every error that reaches a screen falls into exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or malformed input caught before a network call
    Validation,
    /// Missing or expired credentials; redirect to login
    Authentication,
    /// Non-2xx JSON response from the backend
    Server,
    /// Backend answered with an HTML page where JSON was expected
    MalformedUpstream,
    /// No response received
    Connectivity,
    /// Local storage failure; fatal to the current action only
    LocalStorage,
}

impl ErrorCategory {
    /// Classifies an error chain.
    ///
    /// Errors that are neither [`DermascanError`] nor [`ApiError`] are
    /// reported as [`ErrorCategory::LocalStorage`] only when they are IO
    /// errors; anything else is treated as a server-side failure.
    pub fn of(err: &anyhow::Error) -> Self {
        if let Some(api) = err.downcast_ref::<ApiError>() {
            return api.category();
        }
        match err.downcast_ref::<DermascanError>() {
            Some(DermascanError::Validation(_)) | Some(DermascanError::Config(_)) => {
                Self::Validation
            }
            Some(DermascanError::Authentication(_)) => Self::Authentication,
            Some(DermascanError::MissingPatientIdentity) => Self::Authentication,
            Some(DermascanError::Api(api)) => api.category(),
            Some(DermascanError::Storage(_)) | Some(DermascanError::Serialization(_)) => {
                Self::LocalStorage
            }
            None if err.downcast_ref::<std::io::Error>().is_some() => Self::LocalStorage,
            None => Self::Server,
        }
    }
}

/// Renders the alert text shown to the user for an error.
///
/// Server and validation errors carry their own message; the remaining
/// categories use fixed wording.
pub fn user_message(err: &anyhow::Error) -> String {
    match ErrorCategory::of(err) {
        ErrorCategory::Connectivity => {
            "Unable to reach the server. Please check your connection.".to_string()
        }
        ErrorCategory::MalformedUpstream => {
            "The server returned an unexpected error page (server misconfiguration). Please try again later."
                .to_string()
        }
        ErrorCategory::Authentication => match err.downcast_ref::<DermascanError>() {
            Some(DermascanError::MissingPatientIdentity) => {
                "Missing patient ID. Please log in again.".to_string()
            }
            _ => "Your session has expired. Please log in again.".to_string(),
        },
        ErrorCategory::LocalStorage => format!("Could not save data on this device: {}", err),
        ErrorCategory::Validation => match err.downcast_ref::<DermascanError>() {
            Some(DermascanError::Validation(msg)) => msg.clone(),
            _ => err.to_string(),
        },
        ErrorCategory::Server => match err.downcast_ref::<ApiError>() {
            Some(api) => api.message(),
            None => match err.downcast_ref::<DermascanError>() {
                Some(DermascanError::Api(api)) => api.message(),
                _ => err.to_string(),
            },
        },
    }
}
