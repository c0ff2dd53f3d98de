//! Error types for the vigia watcher
//!
//! This module defines custom error types used throughout the application.

use thiserror::Error;

/// Errors that can occur while probing a target site
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit detected (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body could not be decoded or parsed
    #[error("Decoding error: {0}")]
    Decode(String),
}

/// Errors that can occur while delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server rejected the delivery
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Channel configuration is invalid
    #[error("Invalid channel configuration: {0}")]
    InvalidConfig(String),
}
