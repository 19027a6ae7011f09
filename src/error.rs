//! Error types for the OneView exporter.
//!
//! Collector-side failures are recovered locally (logged, then the next item
//! is polled); only a listener failure surfaces from `main`.

use thiserror::Error;

/// Main error type for OneView exporter operations.
#[derive(Debug, Error)]
pub enum OneViewError {
    /// Error communicating with the OneView API
    #[error("OneView API error: {0}")]
    Api(#[from] reqwest::Error),

    /// Error parsing a OneView API response
    #[error("Failed to parse OneView API response: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Metrics error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// HTTP server error
    #[error("HTTP server error: {0}")]
    Server(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An inventory call did not finish before its deadline
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    /// A utilization response lacked an expected named metric
    #[error("metric {metric} missing from utilization of {resource}")]
    MissingMetric { resource: String, metric: String },
}

/// Result type alias for OneView exporter operations.
pub type Result<T> = std::result::Result<T, OneViewError>;
