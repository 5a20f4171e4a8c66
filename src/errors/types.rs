//! Error type definitions for the aggregator
//!
//! All error types used throughout the application live here, giving a
//! single place to see what can go wrong and how it maps to responses.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all errors that can cross a layer boundary. It uses
/// `thiserror` to provide automatic error trait implementations and proper
/// error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with key {key}")]
    NotFound { resource: String, key: String },

    /// Resource already exists errors
    #[error("Conflict: {resource} with key {key} already exists")]
    Conflict { resource: String, key: String },

    /// Configuration errors (unusable merge policy, broken config file)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Upstream HTTP errors from playlist fetches
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised while decoding per-request policy overrides
///
/// These never surface to the caller: the override layer drops the offending
/// parameter, logs a warning, and the request proceeds on the stored policy.
#[derive(Error, Debug)]
pub enum OverrideError {
    /// Base64 decoding failures for the bundled-config parameter
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bundle is not valid UTF-8
    #[error("Bundle is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON parsing failures for the bundled-config parameter
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Percent-decoding failures for URL-valued parameters
    #[error("Invalid encoding in parameter {parameter}: {message}")]
    InvalidEncoding { parameter: String, message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found<R: Into<String>, K: Into<String>>(resource: R, key: K) -> Self {
        Self::NotFound {
            resource: resource.into(),
            key: key.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict<R: Into<String>, K: Into<String>>(resource: R, key: K) -> Self {
        Self::Conflict {
            resource: resource.into(),
            key: key.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
