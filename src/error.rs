//! Error types for gallery-relay
//!
//! This module provides error handling for the whole crate, including:
//! - Relay-side errors (bad requests, token validation, upstream failures)
//! - Client-side errors (pagination halts, export failures)
//! - HTTP status code mapping for the API layer
//! - The JSON error body returned by relay endpoints

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for gallery-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gallery-relay
///
/// This is the primary error type used throughout the library. Each variant
/// includes enough context for the API layer to produce a useful JSON body.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "upstream.base_url")
        key: Option<String>,
    },

    /// A required request parameter is missing or malformed
    #[error("{0}")]
    BadRequest(String),

    /// The API token failed format validation (too short or contains whitespace)
    #[error("{0}")]
    Unauthorized(String),

    /// Upstream refused a well-formed credential (401 or 403)
    #[error("upstream rejected API token (HTTP {status})")]
    UpstreamRejected {
        /// The upstream status code, 401 or 403
        status: u16,
    },

    /// Upstream returned any other non-2xx status
    #[error("upstream request failed (HTTP {status})")]
    UpstreamError {
        /// The upstream status code
        status: u16,
    },

    /// Network-level failure reaching an origin
    #[error("bad gateway: {0}")]
    BadGateway(String),

    /// HTTP client error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Export produced nothing, or failed during metadata collection or
    /// archive assembly
    #[error("export failed: {0}")]
    ExportFailure(String),

    /// An operation was rejected because another one is already in flight
    #[error("{0}")]
    Busy(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Archive assembly error
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// JSON error body returned by relay endpoints
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "Missing image URL"
/// }
/// ```
///
/// The optional `details` field carries additional context, such as the
/// upstream status line for gateway failures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message, suitable for displaying to end users
    pub error: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Create a new API error with just a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: None,
        }
    }

    /// Create an API error with additional details
    pub fn with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: Some(details.into()),
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code (used in logs, not the wire body)
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - client error (invalid input)
            Error::Config { .. } => 400,
            Error::BadRequest(_) => 400,

            // 401 Unauthorized - token failed format validation
            Error::Unauthorized(_) => 401,

            // 409 Conflict - another operation holds the in-flight guard
            Error::Busy(_) => 409,

            // 502 Bad Gateway - the upstream is the problem, not the relay
            Error::UpstreamRejected { .. } => 502,
            Error::UpstreamError { .. } => 502,
            Error::BadGateway(_) => 502,
            Error::Network(_) => 502,

            // 500 Internal Server Error
            Error::ExportFailure(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::Archive(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::BadRequest(_) => "bad_request",
            Error::Unauthorized(_) => "unauthorized",
            Error::UpstreamRejected { .. } => "upstream_rejected",
            Error::UpstreamError { .. } => "upstream_error",
            Error::BadGateway(_) => "bad_gateway",
            Error::Network(_) => "network_error",
            Error::ExportFailure(_) => "export_failure",
            Error::Busy(_) => "busy",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::Archive(_) => "archive_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let message = error.to_string();

        // Attach upstream context where the message alone is not enough
        let details = match &error {
            Error::UpstreamRejected { status } => Some(format!(
                "upstream returned {}",
                if *status == 401 {
                    "401 Unauthorized"
                } else {
                    "403 Forbidden"
                }
            )),
            Error::UpstreamError { status } => Some(format!("upstream returned status {status}")),
            _ => None,
        };

        ApiError {
            error: message,
            details,
        }
    }
}
