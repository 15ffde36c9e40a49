//! Error types for Veridoc
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Veridoc operations
///
/// This enum encompasses all possible errors that can occur while talking
/// to the platform backend: configuration loading, credential lookup,
/// upload-destination acquisition, binary transfer, chat streaming, and
/// the thin API wrappers.
#[derive(Error, Debug)]
pub enum VeridocError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential lookup errors (missing or unreadable access token)
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Upload-destination acquisition rejected by the backend
    #[error("Acquisition error: {0}")]
    Acquisition(String),

    /// Binary PUT to a presigned destination failed
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// Backend rejected a request with a non-success status
    #[error("Request failed with status {status}: {body}")]
    Request {
        /// HTTP status code returned by the backend
        status: u16,
        /// Raw response body text
        body: String,
    },

    /// Streamed response body unreadable or undecodable
    #[error("Stream error: {0}")]
    Stream(String),

    /// API wrapper errors (unexpected response shape, bad input)
    #[error("API error: {0}")]
    Api(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for Veridoc operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
