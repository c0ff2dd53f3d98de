//! Unified error handling for the vigia crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`VigiaErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! Nothing surfaced here is fatal to the process: probe failures feed the
//! per-target circuit breaker, notification failures are logged and swallowed,
//! and the only process-ending condition is an external termination signal.

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::utils::error::{NotifyError, ProbeError};

/// Common trait for all vigia error types
///
/// This trait provides a unified interface for error handling across
/// all modules, enabling consistent error processing strategies.
pub trait VigiaErrorTrait: std::error::Error {
    /// Check if this error is recoverable (the operation can be retried,
    /// e.g. by re-probing on the next date or the next sweep)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Notification delivery errors
    Notification,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Notification => "notification",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the vigia crate
///
/// This enum wraps all domain-specific errors, providing a single error type
/// that can be used across module boundaries while preserving the detailed
/// error information.
#[derive(Error, Debug)]
pub enum Error {
    /// Probe errors (fetch, decode, rate limit)
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl VigiaErrorTrait for ProbeError {
    fn is_recoverable(&self) -> bool {
        // Transient probe errors are implicitly retried by being re-probed
        // on the next date or the next sweep
        match self {
            Self::Http(_) | Self::RateLimited | Self::ServerError(_) | Self::Timeout => true,
            Self::Decode(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::RateLimited | Self::ServerError(_) | Self::Timeout => {
                ErrorCategory::Network
            }
            Self::Decode(_) => ErrorCategory::Parsing,
        }
    }
}

impl VigiaErrorTrait for NotifyError {
    fn is_recoverable(&self) -> bool {
        // Deliveries are never retried: losing one alert is preferable to
        // blocking the sweep
        false
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::ServerError(_) => ErrorCategory::Notification,
            Self::InvalidConfig(_) => ErrorCategory::Config,
        }
    }
}

impl VigiaErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Probe(e) => e.is_recoverable(),
            Self::Notify(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Http(_) => true,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Probe(e) => e.category(),
            Self::Notify(e) => e.category(),
            Self::Io(_) => ErrorCategory::Other,
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Http(_) => ErrorCategory::Network,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
