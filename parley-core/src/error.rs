//! # Parley error types
//!
//! One error enum for the whole service layer. The first six variants are the
//! categorization taxonomy; the rest cover local validation, the document
//! store and configuration.
//!
//! ```rust
//! use parley_core::error::ParleyError;
//!
//! let err = ParleyError::from_status(429, "slow down");
//! assert!(err.is_retryable());
//! assert_eq!(err.code(), "rate_limit");
//! ```

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParleyError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParleyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown error (status {status}): {message}")]
    Unknown { status: u16, message: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ParleyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Map a non-2xx HTTP status from the categorization endpoint.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        match status {
            429 => Self::RateLimit(message),
            401 => Self::Unauthorized(message),
            400 => Self::InvalidRequest(message),
            503 => Self::ServiceUnavailable(message),
            _ => Self::Unknown { status, message },
        }
    }

    /// Whether the categorization client may try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimit(_) | Self::ServiceUnavailable(_)
        )
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "network_error",
            Self::Unauthorized(_) => "unauthorized",
            Self::RateLimit(_) => "rate_limit",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Unknown { .. } => "unknown",
            Self::Validation(_) => "validation",
            Self::Storage(_) => "storage",
            Self::Serialization(_) => "serialization",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
        }
    }
}

impl From<serde_json::Error> for ParleyError {
    fn from(e: serde_json::Error) -> Self {
        ParleyError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for ParleyError {
    fn from(e: toml::de::Error) -> Self {
        ParleyError::Config(e.to_string())
    }
}

impl From<std::io::Error> for ParleyError {
    fn from(e: std::io::Error) -> Self {
        ParleyError::Storage(e.to_string())
    }
}

impl From<reqwest::Error> for ParleyError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => ParleyError::from_status(status.as_u16(), e.to_string()),
            None => ParleyError::Network(e.to_string()),
        }
    }
}
